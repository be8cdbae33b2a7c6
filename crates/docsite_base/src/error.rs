use std::error::Error as StdError;
use std::fmt;
use std::path::PathBuf;

/// Error variants that can occur in docsite operations.
///
/// The request path deliberately collapses every failure into a uniform
/// not-found response, but the variants stay distinguishable internally so
/// logs can tell a missing file from malformed data or a renderer crash.
#[derive(Debug)]
pub enum ErrorKind {
    /// File system operation failed
    File {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A data file (JSON/TOML) exists but could not be parsed
    Data { path: PathBuf, message: String },

    /// Markdown rendering or template assembly failed
    Render { message: String },

    /// A published method is missing its canonical service API doc link.
    /// Fatal at generation time; never degraded into partial docs.
    Config { plugin: String, method: String },

    /// Downloading an object from external storage failed
    Fetch { url: String, message: String },

    /// Catch-all for other errors with a message
    Message { message: String },
}

/// Error type wrapping an ErrorKind with optional context strings.
///
/// Two layers keep structural variants (paths, method names) separate from
/// the free-form context attached during propagation.
#[derive(Debug)]
pub struct DocsiteError {
    kind: ErrorKind,
    context: Vec<String>,
}

impl DocsiteError {
    /// Creates a new error from an ErrorKind.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: vec![],
        }
    }

    /// Creates a catch-all message error.
    pub fn message(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Message {
            message: message.into(),
        })
    }

    /// Creates a file error for the given path.
    pub fn file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::new(ErrorKind::File {
            path: path.into(),
            source,
        })
    }

    /// Creates a malformed-data error for the given path.
    pub fn data(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Data {
            path: path.into(),
            message: message.into(),
        })
    }

    /// Creates a renderer/assembly error.
    pub fn render(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Render {
            message: message.into(),
        })
    }

    /// Creates the fatal missing-doc-link configuration error.
    pub fn config(plugin: impl Into<String>, method: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config {
            plugin: plugin.into(),
            method: method.into(),
        })
    }

    /// Creates an object-fetch error.
    pub fn fetch(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Fetch {
            url: url.into(),
            message: message.into(),
        })
    }

    /// Attaches context to an error.
    /// Context is displayed before the error message.
    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    /// Attaches context using lazy evaluation.
    /// Useful to avoid expensive string construction for successful paths.
    pub fn with_context<F>(mut self, f: F) -> Self
    where
        F: FnOnce() -> String,
    {
        self.context.push(f());
        self
    }

    /// Returns a reference to the underlying ErrorKind.
    /// Allows pattern matching on specific error variants.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Returns the innermost error in the chain.
    pub fn root_cause(&self) -> &(dyn StdError + 'static) {
        let mut current: &(dyn StdError + 'static) = self;
        while let Some(next) = current.source() {
            current = next;
        }
        current
    }
}

impl From<ErrorKind> for DocsiteError {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

impl StdError for DocsiteError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match &self.kind {
            ErrorKind::File { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl fmt::Display for DocsiteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, ctx) in self.context.iter().enumerate() {
            if i == 0 {
                write!(f, "{}", ctx)?;
            } else {
                write!(f, ": {}", ctx)?;
            }
        }
        if !self.context.is_empty() {
            write!(f, ": ")?;
        }

        match &self.kind {
            ErrorKind::File { path, source } => {
                write!(f, "file error at {}: {}", path.display(), source)
            }
            ErrorKind::Data { path, message } => {
                write!(f, "malformed data in {}: {}", path.display(), message)
            }
            ErrorKind::Render { message } => {
                write!(f, "render error: {}", message)
            }
            ErrorKind::Config { plugin, method } => {
                write!(
                    f,
                    "all methods must refer to a canonical service API doc: {} {}",
                    plugin, method
                )
            }
            ErrorKind::Fetch { url, message } => {
                write!(f, "failed to fetch {}: {}", url, message)
            }
            ErrorKind::Message { message } => {
                write!(f, "{}", message)
            }
        }
    }
}

/// Standard result type for docsite operations.
///
/// The error is boxed to keep the Ok path small.
pub type DocsiteResult<T> = std::result::Result<T, Box<DocsiteError>>;

/// Creates a boxed catch-all error from a format string.
#[macro_export]
macro_rules! err {
    ($($arg:tt)*) => {
        Box::new($crate::error::DocsiteError::message(format!($($arg)*)))
    };
}

/// Extension trait for attaching context to Results.
pub trait ResultExt<T> {
    /// Attaches context to an error, consuming and re-wrapping it.
    fn context(self, context: impl Into<String>) -> DocsiteResult<T>;

    /// Attaches context using lazy evaluation.
    /// Context is only evaluated if the result is an error.
    fn with_context<F>(self, f: F) -> DocsiteResult<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for DocsiteResult<T> {
    fn context(self, context: impl Into<String>) -> DocsiteResult<T> {
        self.map_err(|err| Box::new(err.context(context)))
    }

    fn with_context<F>(self, f: F) -> DocsiteResult<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|err| Box::new(err.with_context(f)))
    }
}
