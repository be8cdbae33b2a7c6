use std::io::{Read, Seek, Write};
use std::sync::Arc;

use crate::DocsiteResult;

use super::file_path::FilePath;
use super::http::{HttpServerConfig, HttpServerHandle, HttpService};

/// Trait combining Read + Seek for file operations.
///
/// Enables returning opaque file handles backed by either real files or
/// in-memory buffers.
pub trait ReadSeek: Read + Seek {}
impl<T: Read + Seek> ReadSeek for T {}

/// Platform Abstraction Layer (PAL) trait.
///
/// Covers the three external surfaces of the site: the filesystem (markdown
/// pages, service JSON, generated data files), external object storage
/// (benchmark results), and the HTTP server. Two implementations are
/// provided: `RealPal` (std::fs / ureq / tiny_http) and `MockPal`
/// (in-memory, for tests).
pub trait Pal: std::fmt::Debug + Send + Sync + 'static {
    /// Check if a file exists at the given path.
    fn file_exists(&self, path: &FilePath) -> DocsiteResult<bool>;

    /// Open a file for reading.
    fn read_file(&self, path: &FilePath) -> DocsiteResult<Box<dyn ReadSeek + 'static>>;

    /// Read entire file contents as a UTF-8 string.
    fn read_file_to_string(&self, path: &FilePath) -> DocsiteResult<String> {
        use std::io::Read;
        let mut reader = self.read_file(path)?;
        let mut contents = Vec::new();
        reader.read_to_end(&mut contents).map_err(|e| {
            Box::new(crate::DocsiteError::file(
                path.as_path().to_path_buf(),
                e,
            ))
        })?;
        String::from_utf8(contents).map_err(|_e| crate::err!("File is not valid UTF-8: {}", path))
    }

    /// Create a new file, overwriting if it exists.
    fn create_file(&self, path: &FilePath) -> DocsiteResult<Box<dyn Write>>;

    /// Create a directory and all parent directories.
    fn create_directory_all(&self, path: &FilePath) -> DocsiteResult<()>;

    /// Fetch one object from external storage by URL.
    ///
    /// Used only by the offline benchmark fetcher; there are no timeouts and
    /// no retries, matching the batch job's all-or-nothing failure model.
    fn fetch_object(&self, url: &str) -> DocsiteResult<Vec<u8>>;

    /// Start an HTTP server with the given service.
    ///
    /// Returns a handle to the running server. The server starts listening
    /// immediately; dropping the handle (or calling shutdown()) stops the
    /// accept loop.
    fn start_http_server(
        &self,
        service: Box<dyn HttpService>,
        config: HttpServerConfig,
    ) -> DocsiteResult<HttpServerHandle>;
}

/// Handle to a PAL implementation, enabling shared ownership.
///
/// Wraps `Arc<dyn Pal>` for cheap cloning and thread-safe sharing, so the
/// renderer, the assembler and the offline jobs can all hold the same
/// implementation without lifetime plumbing.
#[derive(Debug, Clone)]
pub struct PalHandle(Arc<dyn Pal>);

impl PalHandle {
    /// Create a new PalHandle from a Pal implementation.
    pub fn new(pal: impl Pal + 'static) -> Self {
        Self(Arc::new(pal))
    }
}

impl std::ops::Deref for PalHandle {
    type Target = dyn Pal;

    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pal::mock::MockPal;

    #[test]
    fn test_pal_handle_clone() {
        let pal = PalHandle::new(MockPal::new());
        let clone = pal.clone();
        pal.create_directory_all(&FilePath::from("data")).unwrap();
        // Both handles see the same underlying implementation
        assert!(!clone.file_exists(&FilePath::from("data/s3.json")).unwrap());
    }

    #[test]
    fn test_read_file_to_string_default_impl() {
        let pal = MockPal::new();
        pal.add_file(FilePath::from("index.md"), b"# Hello".to_vec());
        let content = pal.read_file_to_string(&FilePath::from("index.md")).unwrap();
        assert_eq!(content, "# Hello");
    }

    #[test]
    fn test_read_file_to_string_invalid_utf8() {
        let pal = MockPal::new();
        pal.add_file(FilePath::from("bin.dat"), vec![0xff, 0xfe, 0xfd]);
        let result = pal.read_file_to_string(&FilePath::from("bin.dat"));
        assert!(result.is_err());
    }
}
