/* Site configuration.

Loaded from `docsite.toml` in the working directory. Every key has a
default matching the conventional repo layout, so an empty file (or one
with only overrides) is valid. */

use serde::Deserialize;

use docsite_base::{DocsiteError, DocsiteResult, FilePath, PalHandle};

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Site title, used for logging only
    pub title: String,
    /// Directory holding the markdown doc pages
    pub docs_dir: String,
    /// Directory holding generated per-service descriptor JSON
    pub data_dir: String,
    /// The shared service page template
    pub template_path: String,
    /// Package scope prefixed to service slugs in page headings
    pub package_scope: String,
    /// Directory for fetched benchmark JSON
    pub api_dir: String,
    /// Directory for fetched non-JSON benchmark assets
    pub public_dir: String,
    /// Ordered plugin manifest consumed by the data regenerator
    pub plugins_manifest: String,
    /// Directory of per-plugin method tables
    pub plugins_dir: String,
    /// Consolidated service index written by the data regenerator
    pub services_index: String,
    /// Base URL of the benchmark asset bucket
    pub assets_base_url: String,
    pub host: String,
    /// None binds an ephemeral port
    pub port: Option<u16>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            title: "docsite".to_string(),
            docs_dir: "app/docs".to_string(),
            data_dir: "app/docs/services/data".to_string(),
            template_path: "app/docs/services/$service.md".to_string(),
            package_scope: "@aws-lite".to_string(),
            api_dir: "app/api".to_string(),
            public_dir: "public".to_string(),
            plugins_manifest: "scripts/plugins.json".to_string(),
            plugins_dir: "scripts/plugins".to_string(),
            services_index: "app/elements/services.json".to_string(),
            assets_base_url:
                "https://performanceproduction-assetsbucket-1xqwku8953q8m.s3.us-west-2.amazonaws.com"
                    .to_string(),
            host: "127.0.0.1".to_string(),
            port: Some(3333),
        }
    }
}

impl Config {
    pub fn docs_dir(&self) -> FilePath {
        FilePath::from(self.docs_dir.as_str())
    }

    pub fn data_dir(&self) -> FilePath {
        FilePath::from(self.data_dir.as_str())
    }

    pub fn template_path(&self) -> FilePath {
        FilePath::from(self.template_path.as_str())
    }

    pub fn api_dir(&self) -> FilePath {
        FilePath::from(self.api_dir.as_str())
    }

    pub fn public_dir(&self) -> FilePath {
        FilePath::from(self.public_dir.as_str())
    }

    pub fn plugins_manifest(&self) -> FilePath {
        FilePath::from(self.plugins_manifest.as_str())
    }

    pub fn plugins_dir(&self) -> FilePath {
        FilePath::from(self.plugins_dir.as_str())
    }

    pub fn services_index(&self) -> FilePath {
        FilePath::from(self.services_index.as_str())
    }
}

/// Load the configuration file, falling back to defaults when it is absent.
pub fn load_config(pal: &PalHandle, path: &FilePath) -> DocsiteResult<Config> {
    if !pal.file_exists(path)? {
        return Ok(Config::default());
    }
    let text = pal.read_file_to_string(path)?;
    toml::from_str(&text)
        .map_err(|e| Box::new(DocsiteError::data(path.as_path().to_path_buf(), e.to_string())))
}
