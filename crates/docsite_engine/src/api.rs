/* HTTP request handling.

One catch-all route: the request path is the page slug. Everything the
renderer cannot resolve, and every non-GET request, gets the same JSON
not-found response. */

use std::sync::Arc;

use serde_json::json;
use tracing::warn;

use docsite_base::{HttpMethod, HttpRequest, HttpResponse, HttpService};

use crate::site::{PageRenderer, PageStatus};

/// The site's single HTTP service, routing every request through the
/// page renderer.
#[derive(Debug)]
pub struct ApiService {
    renderer: Arc<PageRenderer>,
}

impl ApiService {
    pub fn new(renderer: Arc<PageRenderer>) -> Self {
        Self { renderer }
    }
}

impl HttpService for ApiService {
    fn handle_request(&self, request: HttpRequest) -> HttpResponse {
        if request.method() != &HttpMethod::Get {
            warn!(method = %request.method(), path = %request.path(), "non-GET request");
            return HttpResponse::not_found(serialize(&json!({ "doc": "Page not found" })));
        }

        let slug = request.path().split('?').next().unwrap_or("");
        let page = self.renderer.get_page(slug);
        let body = serialize(&page.json);
        match page.status {
            PageStatus::Ok => HttpResponse::json(body),
            PageStatus::NotFound => HttpResponse::not_found(body),
        }
    }
}

/// JSON-encode a payload. Serialization of an in-memory Value cannot
/// realistically fail; should it ever, the response degrades to an empty
/// object rather than a dropped connection.
fn serialize(value: &serde_json::Value) -> Vec<u8> {
    serde_json::to_vec(value).unwrap_or_else(|e| {
        warn!(error = %e, "payload serialization failed");
        b"{}".to_vec()
    })
}
