/* HTTP types for the PAL server abstraction.

The site serves a single catch-all GET route returning JSON, so these types
are deliberately small: byte bodies only, no streaming, no header plumbing
beyond the content type. The HttpService trait is infallible by design;
request-time failures are resolved to a not-found response inside the
service and never escape as errors. */

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// HTTP methods the service distinguishes.
///
/// Everything that is not a GET gets the uniform not-found treatment, so a
/// single catch-all variant covers the rest of the verb space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Other(String),
}

impl HttpMethod {
    /// Parse an HTTP method from its wire representation.
    pub fn parse(method: &str) -> Self {
        if method.eq_ignore_ascii_case("GET") {
            Self::Get
        } else {
            Self::Other(method.to_uppercase())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Get => "GET",
            Self::Other(name) => name,
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An incoming HTTP request, reduced to what the page service consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    method: HttpMethod,
    path: String,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
        }
    }

    /// Shorthand for a GET request, the only verb the site answers.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub fn method(&self) -> &HttpMethod {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Response status codes the site can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpStatus {
    Ok,
    NotFound,
}

impl HttpStatus {
    pub fn as_u16(&self) -> u16 {
        match self {
            Self::Ok => 200,
            Self::NotFound => 404,
        }
    }
}

/// An outgoing HTTP response with a fixed byte body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    status: HttpStatus,
    content_type: String,
    body: Vec<u8>,
}

impl HttpResponse {
    /// Create a 200 JSON response.
    pub fn json(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: HttpStatus::Ok,
            content_type: "application/json".to_string(),
            body: body.into(),
        }
    }

    /// Create a 404 JSON response.
    pub fn not_found(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: HttpStatus::NotFound,
            content_type: "application/json".to_string(),
            body: body.into(),
        }
    }

    pub fn status(&self) -> HttpStatus {
        self.status
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Body as a UTF-8 string, for assertions in tests.
    pub fn body_string(&self) -> Option<String> {
        String::from_utf8(self.body.clone()).ok()
    }

    pub fn into_body(self) -> Vec<u8> {
        self.body
    }
}

/// Configuration for the HTTP server.
#[derive(Debug, Clone)]
pub struct HttpServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on. If None, the OS will assign an available port.
    pub port: Option<u16>,
}

impl HttpServerConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: None,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// The bind address; port 0 asks the OS for a free port.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port.unwrap_or(0))
    }
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: None,
        }
    }
}

/// Trait for handling HTTP requests.
///
/// The single implementation routes every path through the page renderer.
/// Returning HttpResponse directly (not a Result) encodes the failure
/// policy: all errors are resolved to a not-found response inside.
pub trait HttpService: std::fmt::Debug + Send + Sync + 'static {
    fn handle_request(&self, request: HttpRequest) -> HttpResponse;
}

/// Handle to a running HTTP server.
///
/// Dropping the last handle signals the accept loop to stop taking new
/// connections; clones share the same server and may be dropped freely.
#[derive(Debug, Clone)]
pub struct HttpServerHandle {
    inner: Arc<HandleInner>,
}

#[derive(Debug)]
struct HandleInner {
    port: u16,
    shutdown: Arc<AtomicBool>,
}

impl HttpServerHandle {
    pub fn new(port: u16) -> Self {
        Self {
            inner: Arc::new(HandleInner {
                port,
                shutdown: Arc::new(AtomicBool::new(false)),
            }),
        }
    }

    /// The port the server is listening on.
    pub fn port(&self) -> u16 {
        self.inner.port
    }

    /// Signal the server to stop accepting new connections.
    pub fn shutdown(&self) {
        self.inner.shutdown.store(true, Ordering::SeqCst);
    }

    pub fn is_shutdown(&self) -> bool {
        self.inner.shutdown.load(Ordering::SeqCst)
    }

    /// Access the shutdown flag (for use by PAL implementations).
    pub fn shutdown_flag(&self) -> &Arc<AtomicBool> {
        &self.inner.shutdown
    }
}

// The flag lives on the inner struct so that only the last clone's drop
// stops the server.
impl Drop for HandleInner {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_method_parse() {
        assert_eq!(HttpMethod::parse("GET"), HttpMethod::Get);
        assert_eq!(HttpMethod::parse("get"), HttpMethod::Get);
        assert_eq!(
            HttpMethod::parse("POST"),
            HttpMethod::Other("POST".to_string())
        );
    }

    #[test]
    fn test_http_request_get() {
        let request = HttpRequest::get("/services/s3");
        assert_eq!(request.method(), &HttpMethod::Get);
        assert_eq!(request.path(), "/services/s3");
    }

    #[test]
    fn test_http_response_json() {
        let response = HttpResponse::json(r#"{"page":"index"}"#);
        assert_eq!(response.status(), HttpStatus::Ok);
        assert_eq!(response.content_type(), "application/json");
        assert_eq!(response.body_string().unwrap(), r#"{"page":"index"}"#);
    }

    #[test]
    fn test_http_response_not_found() {
        let response = HttpResponse::not_found(r#"{"doc":"Page not found"}"#);
        assert_eq!(response.status().as_u16(), 404);
    }

    #[test]
    fn test_http_server_config_address() {
        let config = HttpServerConfig::new("127.0.0.1").with_port(3333);
        assert_eq!(config.address(), "127.0.0.1:3333");
        assert_eq!(HttpServerConfig::default().address(), "127.0.0.1:0");
    }

    #[test]
    fn test_http_server_handle_shutdown() {
        let handle = HttpServerHandle::new(8080);
        assert_eq!(handle.port(), 8080);
        assert!(!handle.is_shutdown());
        handle.shutdown();
        assert!(handle.is_shutdown());
    }

    #[test]
    fn test_only_last_clone_drop_shuts_down() {
        let handle = HttpServerHandle::new(8080);
        let flag = handle.shutdown_flag().clone();

        let clone = handle.clone();
        drop(clone);
        assert!(!handle.is_shutdown());

        drop(handle);
        assert!(flag.load(Ordering::SeqCst));
    }
}
