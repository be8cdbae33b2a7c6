/* Plugin data regeneration.

Offline job that merges the plugin manifest with each plugin's method
table into the per-service descriptor JSON the site serves from, plus the
consolidated service index. Runs unattended before deploys; any failure
is fatal. */

use std::io::Write;
use std::time::Instant;

use indexmap::IndexMap;
use serde::Deserialize;
use tracing::{debug, info, instrument};

use docsite_base::{DocsiteError, DocsiteResult, FilePath, PalHandle};

use crate::config::Config;
use crate::model::{MethodEntry, ServiceDescriptor, ServiceIndexEntry};

/// One manifest entry: the plugin roster with display names and credits.
#[derive(Debug, Deserialize)]
struct ManifestEntry {
    service: String,
    display: String,
    #[serde(default)]
    maintainers: Vec<String>,
}

/// A plugin's own method table, as published by the plugin repo.
/// Entries valued `false` are unimplemented-method stubs and pass through.
#[derive(Debug, Deserialize)]
struct PluginSource {
    property: String,
    #[serde(default)]
    methods: IndexMap<String, MethodEntry>,
}

/// Regenerate all per-service descriptor files and the service index.
///
/// Services keep the manifest's order in the index. Idempotent: existing
/// files are overwritten.
#[instrument(skip(pal, config))]
pub fn generate_plugin_data(pal: &PalHandle, config: &Config) -> DocsiteResult<()> {
    let start = Instant::now();
    let manifest = read_manifest(pal, &config.plugins_manifest())?;

    let data_dir = config.data_dir();
    pal.create_directory_all(&data_dir)?;

    let mut index = Vec::with_capacity(manifest.len());
    for entry in manifest {
        let plugin = read_plugin(pal, &config.plugins_dir(), &entry.service)?;
        let descriptor = ServiceDescriptor {
            service: entry.service.clone(),
            display: entry.display.clone(),
            maintainers: entry.maintainers,
            property: plugin.property,
            methods: plugin.methods,
        };
        write_json(pal, &data_dir.join(format!("{}.json", entry.service)), &descriptor)?;
        debug!(service = %entry.service, "wrote service descriptor");

        index.push(ServiceIndexEntry {
            service: entry.service,
            display: entry.display,
        });
    }

    write_json(pal, &config.services_index(), &index)?;
    info!(
        services = index.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "generated plugin data"
    );
    Ok(())
}

fn read_manifest(pal: &PalHandle, path: &FilePath) -> DocsiteResult<Vec<ManifestEntry>> {
    let text = pal.read_file_to_string(path)?;
    serde_json::from_str(&text)
        .map_err(|e| Box::new(DocsiteError::data(path.as_path().to_path_buf(), e.to_string())))
}

fn read_plugin(pal: &PalHandle, plugins_dir: &FilePath, service: &str) -> DocsiteResult<PluginSource> {
    let path = plugins_dir.join(format!("{service}.json"));
    let text = pal.read_file_to_string(&path)?;
    serde_json::from_str(&text)
        .map_err(|e| Box::new(DocsiteError::data(path.as_path().to_path_buf(), e.to_string())))
}

fn write_json<T: serde::Serialize>(pal: &PalHandle, path: &FilePath, value: &T) -> DocsiteResult<()> {
    let bytes = serde_json::to_vec(value)
        .map_err(|e| Box::new(DocsiteError::data(path.as_path().to_path_buf(), e.to_string())))?;
    let mut writer = pal.create_file(path)?;
    writer
        .write_all(&bytes)
        .map_err(|e| Box::new(DocsiteError::file(path.as_path().to_path_buf(), e)))?;
    Ok(())
}
