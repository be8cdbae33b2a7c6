/* docsite_base provides the foundational error handling, tracing setup and
platform abstraction used across all docsite crates. Keeping these in one
leaf crate ensures consistent error handling and prevents circular
dependencies between the engine and the CLI. */

pub mod error;
pub mod pal;
pub mod tracing;

// Re-export commonly used types for convenience
pub use error::{DocsiteError, DocsiteResult, ErrorKind, ResultExt};
pub use pal::http::{
    HttpMethod, HttpRequest, HttpResponse, HttpServerConfig, HttpServerHandle, HttpService,
    HttpStatus,
};
pub use pal::{FilePath, MockPal, Pal, PalHandle, ReadSeek, RealPal};
