use std::fs;
use std::io::{Read, Write};
use std::path::PathBuf;
use std::time::Duration;

use tracing::{debug, info, instrument, warn};

use crate::{DocsiteError, DocsiteResult};

use super::FilePath;
use super::http::{
    HttpMethod, HttpRequest, HttpServerConfig, HttpServerHandle, HttpService,
};
use super::traits::{Pal, ReadSeek};

/// Concrete PAL implementation using the real filesystem, a blocking HTTP
/// client (ureq) for object fetches, and tiny_http for the server.
///
/// All file paths are resolved relative to a configured base directory.
/// Everything stays synchronous; the server runs its accept loop on one
/// spawned thread.
#[derive(Debug)]
pub struct RealPal {
    base_dir: PathBuf,
}

impl RealPal {
    /// Create a new RealPal with the given base directory.
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Resolve a FilePath to an absolute filesystem path.
    fn resolve_path(&self, path: &FilePath) -> PathBuf {
        self.base_dir.join(path.as_path())
    }
}

impl Pal for RealPal {
    #[instrument(skip(self), fields(path = %path))]
    fn file_exists(&self, path: &FilePath) -> DocsiteResult<bool> {
        let resolved = self.resolve_path(path);
        let exists = resolved.exists();
        debug!(exists, resolved = %resolved.display(), "checked file existence");
        Ok(exists)
    }

    #[instrument(skip(self), fields(path = %path))]
    fn read_file(&self, path: &FilePath) -> DocsiteResult<Box<dyn ReadSeek + 'static>> {
        let resolved = self.resolve_path(path);
        debug!(resolved = %resolved.display(), "opening file for reading");
        let file = fs::File::open(&resolved).map_err(|e| {
            debug!(error = %e, "failed to open file");
            Box::new(DocsiteError::file(resolved, e))
        })?;
        Ok(Box::new(file))
    }

    #[instrument(skip(self), fields(path = %path))]
    fn create_file(&self, path: &FilePath) -> DocsiteResult<Box<dyn Write>> {
        let resolved = self.resolve_path(path);
        debug!(resolved = %resolved.display(), "creating file");
        let file = fs::File::create(&resolved).map_err(|e| {
            debug!(error = %e, "failed to create file");
            Box::new(DocsiteError::file(resolved, e))
        })?;
        Ok(Box::new(file))
    }

    #[instrument(skip(self), fields(path = %path))]
    fn create_directory_all(&self, path: &FilePath) -> DocsiteResult<()> {
        let resolved = self.resolve_path(path);
        debug!(resolved = %resolved.display(), "creating directory and parents");
        fs::create_dir_all(&resolved)
            .map_err(|e| Box::new(DocsiteError::file(resolved, e)))?;
        Ok(())
    }

    #[instrument(skip(self))]
    fn fetch_object(&self, url: &str) -> DocsiteResult<Vec<u8>> {
        debug!("fetching object");
        let response = ureq::get(url)
            .call()
            .map_err(|e| Box::new(DocsiteError::fetch(url, e.to_string())))?;
        let mut bytes = Vec::new();
        response
            .into_reader()
            .read_to_end(&mut bytes)
            .map_err(|e| Box::new(DocsiteError::fetch(url, e.to_string())))?;
        debug!(size = bytes.len(), "object fetched");
        Ok(bytes)
    }

    fn start_http_server(
        &self,
        service: Box<dyn HttpService>,
        config: HttpServerConfig,
    ) -> DocsiteResult<HttpServerHandle> {
        let server = tiny_http::Server::http(config.address())
            .map_err(|e| crate::err!("failed to bind HTTP server on {}: {}", config.address(), e))?;

        let port = server
            .server_addr()
            .to_ip()
            .map(|addr| addr.port())
            .unwrap_or(0);
        let handle = HttpServerHandle::new(port);
        let shutdown = handle.shutdown_flag().clone();

        info!(port, "HTTP server listening");

        std::thread::spawn(move || {
            while !shutdown.load(std::sync::atomic::Ordering::SeqCst) {
                // Poll with a timeout so the shutdown flag is observed
                match server.recv_timeout(Duration::from_millis(200)) {
                    Ok(Some(request)) => serve_one(&*service, request),
                    Ok(None) => continue,
                    Err(e) => {
                        warn!(error = %e, "HTTP accept loop error, stopping");
                        break;
                    }
                }
            }
            debug!("HTTP server accept loop stopped");
        });

        Ok(handle)
    }
}

/// Convert one tiny_http request, run the service, write the response.
fn serve_one(service: &dyn HttpService, request: tiny_http::Request) {
    let method = HttpMethod::parse(request.method().as_str());
    let path = request.url().to_string();
    debug!(%method, %path, "handling request");

    let response = service.handle_request(HttpRequest::new(method, path));

    let status = response.status().as_u16();
    let content_type = response.content_type().to_string();
    let body = response.into_body();

    let mut out = tiny_http::Response::from_data(body)
        .with_status_code(tiny_http::StatusCode(status));
    if let Ok(header) =
        tiny_http::Header::from_bytes(&b"Content-Type"[..], content_type.as_bytes())
    {
        out = out.with_header(header);
    }
    if let Err(e) = request.respond(out) {
        warn!(error = %e, "failed to write HTTP response");
    }
}
