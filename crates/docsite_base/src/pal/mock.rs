use std::collections::{HashMap, HashSet};
use std::io::{Cursor, Write};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU16, AtomicUsize, Ordering};

use crate::DocsiteError;
use crate::DocsiteResult;

use super::FilePath;
use super::http::{HttpRequest, HttpResponse, HttpServerConfig, HttpServerHandle, HttpService};
use super::traits::{Pal, ReadSeek};

/// In-memory PAL implementation for testing.
///
/// Stores file contents and remote objects in HashMaps and registers HTTP
/// services in-process, supporting all Pal operations without touching the
/// real filesystem or network. Every `read_file` is counted so tests can
/// assert that a cached page performs no file I/O on subsequent requests.
///
/// # Examples
///
/// ```
/// use docsite_base::{FilePath, MockPal, Pal};
///
/// let mock = MockPal::new();
/// mock.add_file(FilePath::from("index.md"), b"# Home".to_vec());
/// let content = mock.read_file_to_string(&FilePath::from("index.md")).unwrap();
/// assert_eq!(content, "# Home");
/// assert_eq!(mock.read_count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct MockPal {
    files: Arc<Mutex<HashMap<FilePath, Vec<u8>>>>,
    directories: Arc<Mutex<HashSet<FilePath>>>,
    objects: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    http_servers: Arc<Mutex<HashMap<u16, Arc<dyn HttpService>>>>,
    next_port: Arc<AtomicU16>,
    reads: Arc<AtomicUsize>,
}

impl MockPal {
    /// Create a new empty MockPal.
    pub fn new() -> Self {
        Self {
            files: Arc::new(Mutex::new(HashMap::new())),
            directories: Arc::new(Mutex::new(HashSet::new())),
            objects: Arc::new(Mutex::new(HashMap::new())),
            http_servers: Arc::new(Mutex::new(HashMap::new())),
            next_port: Arc::new(AtomicU16::new(10000)),
            reads: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Add a file to the mock storage.
    pub fn add_file(&self, path: FilePath, content: Vec<u8>) {
        self.files.lock().unwrap().insert(path, content);
    }

    /// Add a remote object addressable by URL.
    pub fn add_object(&self, url: impl Into<String>, content: Vec<u8>) {
        self.objects.lock().unwrap().insert(url.into(), content);
    }

    /// Number of file-open operations performed so far.
    ///
    /// Lets tests observe that a cache hit performs no file I/O.
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Simulate an HTTP request against a registered server.
    pub fn simulate_request(
        &self,
        port: u16,
        request: HttpRequest,
    ) -> DocsiteResult<HttpResponse> {
        let service = {
            let servers = self.http_servers.lock().unwrap();
            servers
                .get(&port)
                .cloned()
                .ok_or_else(|| {
                    Box::new(DocsiteError::message(format!(
                        "No HTTP server registered on port {}",
                        port
                    )))
                })?
        };
        Ok(service.handle_request(request))
    }

    /// Get the number of registered HTTP servers.
    pub fn http_server_count(&self) -> usize {
        self.http_servers.lock().unwrap().len()
    }
}

impl Default for MockPal {
    fn default() -> Self {
        Self::new()
    }
}

impl Pal for MockPal {
    fn file_exists(&self, path: &FilePath) -> DocsiteResult<bool> {
        let files = self.files.lock().unwrap();
        Ok(files.contains_key(path))
    }

    fn read_file(&self, path: &FilePath) -> DocsiteResult<Box<dyn ReadSeek + 'static>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let files = self.files.lock().unwrap();
        let content = files
            .get(path)
            .ok_or_else(|| {
                Box::new(DocsiteError::file(
                    path.as_path().to_path_buf(),
                    std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        format!("File not found: {}", path),
                    ),
                ))
            })?
            .clone();
        Ok(Box::new(Cursor::new(content)))
    }

    fn create_file(&self, path: &FilePath) -> DocsiteResult<Box<dyn Write>> {
        // The writer stores into the mock storage when dropped
        Ok(Box::new(MockFileWriter {
            path: path.clone(),
            files: Arc::clone(&self.files),
            buffer: Vec::new(),
        }))
    }

    fn create_directory_all(&self, path: &FilePath) -> DocsiteResult<()> {
        self.directories.lock().unwrap().insert(path.clone());
        Ok(())
    }

    fn fetch_object(&self, url: &str) -> DocsiteResult<Vec<u8>> {
        let objects = self.objects.lock().unwrap();
        objects
            .get(url)
            .cloned()
            .ok_or_else(|| Box::new(DocsiteError::fetch(url, "object not found")))
    }

    fn start_http_server(
        &self,
        service: Box<dyn HttpService>,
        config: HttpServerConfig,
    ) -> DocsiteResult<HttpServerHandle> {
        let port = match config.port {
            Some(p) => p,
            None => self.next_port.fetch_add(1, Ordering::SeqCst),
        };
        self.http_servers
            .lock()
            .unwrap()
            .insert(port, Arc::from(service));
        Ok(HttpServerHandle::new(port))
    }
}

/// Helper struct for writing files to MockPal.
struct MockFileWriter {
    path: FilePath,
    files: Arc<Mutex<HashMap<FilePath, Vec<u8>>>>,
    buffer: Vec<u8>,
}

impl Write for MockFileWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl Drop for MockFileWriter {
    fn drop(&mut self) {
        self.files
            .lock()
            .unwrap()
            .insert(self.path.clone(), self.buffer.clone());
    }
}
