/* Page rendering and response caching.

The page renderer answers every site request: it resolves a slug to a
service page or a static doc page, renders it, and caches the finished
JSON payload in memory. Rendering failures never escape; any failure
collapses to a uniform not-found response, with the underlying error
logged. */

use std::sync::Arc;

use serde_json::{Value, json};
use tracing::{debug, instrument, warn};

use docsite_base::{DocsiteError, DocsiteResult, FilePath, PalHandle, err};

use crate::assemble::ServiceAssembler;
use crate::cache::{CacheHandle, CachedPage};
use crate::config::Config;
use crate::perf::{Checksum, PerfStats, interpolate_perf_page};
use crate::render::render_markdown;

const PERF_PAGE: &str = "performance";
const PERF_STATS_FILE: &str = "latest-results-parsed.json";
const PERF_CHECKSUM_FILE: &str = "checksum.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStatus {
    Ok,
    NotFound,
}

/// The outcome of a page request: a status and the JSON payload to send.
#[derive(Debug, Clone)]
pub struct PageResponse {
    pub status: PageStatus,
    pub json: CachedPage,
}

/// Renders pages on demand and serves repeats from the in-memory cache.
#[derive(Debug)]
pub struct PageRenderer {
    pal: PalHandle,
    docs_dir: FilePath,
    api_dir: FilePath,
    assembler: ServiceAssembler,
    cache: CacheHandle,
    /// Included in every payload; true only in production deploys
    analytics: bool,
}

impl PageRenderer {
    pub fn new(
        pal: PalHandle,
        config: &Config,
        assembler: ServiceAssembler,
        cache: CacheHandle,
        analytics: bool,
    ) -> Self {
        Self {
            pal,
            docs_dir: config.docs_dir(),
            api_dir: config.api_dir(),
            assembler,
            cache,
            analytics,
        }
    }

    /// Resolve and render the page for a request slug.
    ///
    /// Infallible by design: a page that cannot be rendered, for whatever
    /// reason, is a page that does not exist.
    #[instrument(skip(self))]
    pub fn get_page(&self, raw_slug: &str) -> PageResponse {
        let slug = normalize_slug(raw_slug);

        if let Some(page) = self.cache.get(&slug) {
            debug!(%slug, "cache hit");
            return PageResponse {
                status: PageStatus::Ok,
                json: page,
            };
        }

        match self.render_page(&slug) {
            Ok(page) => PageResponse {
                status: PageStatus::Ok,
                json: page,
            },
            Err(error) => {
                warn!(%slug, %error, "page not renderable");
                PageResponse {
                    status: PageStatus::NotFound,
                    json: Arc::new(json!({ "doc": "Page not found", "page": slug })),
                }
            }
        }
    }

    fn render_page(&self, slug: &str) -> DocsiteResult<CachedPage> {
        if let Some(service) = slug.strip_prefix("services/") {
            return self.render_service_page(slug, service);
        }

        let path = self.docs_dir.join(format!("{slug}.md"));
        let mut contents = self.pal.read_file_to_string(&path)?;
        if slug == PERF_PAGE {
            contents = self.interpolate_perf(&contents)?;
        }

        let doc = render_markdown(&contents)?;
        let page = Arc::new(json!({
            "doc": doc,
            "page": slug,
            "analytics": self.analytics,
        }));
        self.cache.insert(slug.to_string(), Arc::clone(&page));
        Ok(page)
    }

    /// Service pages are keyed under both the request slug and the bare
    /// service slug, so either form hits the cache afterwards.
    fn render_service_page(&self, slug: &str, service: &str) -> DocsiteResult<CachedPage> {
        let service = service
            .split('/')
            .next()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| err!("empty service slug in {slug}"))?;

        let assembled = self.assembler.assemble(service)?;
        let doc = render_markdown(&assembled.md)?;

        let mut payload = match to_json(&assembled.descriptor)? {
            Value::Object(map) => map,
            _ => return Err(err!("service descriptor did not serialize to an object")),
        };
        payload.insert("md".to_string(), Value::String(assembled.md));
        payload.insert("doc".to_string(), to_json(&doc)?);
        payload.insert("page".to_string(), Value::String(slug.to_string()));
        payload.insert("isService".to_string(), Value::Bool(true));
        payload.insert("analytics".to_string(), Value::Bool(self.analytics));

        let page = Arc::new(Value::Object(payload));
        self.cache.insert(slug.to_string(), Arc::clone(&page));
        self.cache.insert(service.to_string(), Arc::clone(&page));
        Ok(page)
    }

    fn interpolate_perf(&self, contents: &str) -> DocsiteResult<String> {
        let stats: PerfStats = self.read_api_json(PERF_STATS_FILE)?;
        let checksum: Checksum = self.read_api_json(PERF_CHECKSUM_FILE)?;
        Ok(interpolate_perf_page(contents, &stats, &checksum))
    }

    fn read_api_json<T: serde::de::DeserializeOwned>(&self, name: &str) -> DocsiteResult<T> {
        let path = self.api_dir.join(name);
        let text = self.pal.read_file_to_string(&path)?;
        serde_json::from_str(&text).map_err(|e| {
            Box::new(DocsiteError::data(path.as_path().to_path_buf(), e.to_string()))
        })
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> DocsiteResult<Value> {
    serde_json::to_value(value).map_err(|e| err!("serialization failed: {e}"))
}

/// Strip surrounding slashes; the empty slug is the index page.
fn normalize_slug(raw: &str) -> String {
    let slug = raw.trim_matches('/');
    if slug.is_empty() {
        "index".to_string()
    } else {
        slug.to_string()
    }
}
