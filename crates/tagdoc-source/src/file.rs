//! Source file trait and error types.
//!
//! Provides the core [`SourceFile`] trait for lazy content access, along with
//! [`SourceError`] for unified error handling across file backends.

use std::fmt;
use std::path::{Path, PathBuf};

/// A single input file handed to a plugin.
///
/// `path()` is absolute. `read()` returns the full text content and produces
/// identical results on every call; implementations are free to re-read the
/// underlying resource each time.
pub trait SourceFile: fmt::Debug + Send + Sync {
    /// Absolute path of the file.
    fn path(&self) -> &Path;

    /// Read the full text content.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the file doesn't exist or can't be decoded.
    fn read(&self) -> Result<String, SourceError>;
}

/// Semantic error categories.
#[derive(Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum SourceErrorKind {
    /// File does not exist.
    NotFound,
    /// Permission denied.
    PermissionDenied,
    /// Content is not valid UTF-8.
    InvalidEncoding,
    /// Glob pattern could not be parsed.
    InvalidPattern,
    /// Other/unknown error category.
    Other,
}

/// Source error with semantic kind and backend-specific source.
#[derive(Debug)]
pub struct SourceError {
    /// Semantic error category.
    pub kind: SourceErrorKind,
    /// Path context (if applicable).
    pub path: Option<PathBuf>,
    /// Backend identifier (e.g., "Fs", "Memory").
    pub backend: Option<&'static str>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl SourceError {
    /// Create a new source error.
    #[must_use]
    pub fn new(kind: SourceErrorKind) -> Self {
        Self {
            kind,
            path: None,
            backend: None,
            source: None,
        }
    }

    /// Attach path context.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Attach backend identifier.
    #[must_use]
    pub fn with_backend(mut self, backend: &'static str) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Attach the underlying error source.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Create a not found error with path.
    #[must_use]
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::new(SourceErrorKind::NotFound).with_path(path)
    }

    /// Create a source error from an I/O error.
    #[must_use]
    pub fn io(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::NotFound => SourceErrorKind::NotFound,
            std::io::ErrorKind::PermissionDenied => SourceErrorKind::PermissionDenied,
            std::io::ErrorKind::InvalidData => SourceErrorKind::InvalidEncoding,
            _ => SourceErrorKind::Other,
        };
        Self::new(kind).with_source(err).with_path(path)
    }

    /// Get the path context, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Format: "[Backend] Kind: message (path: /foo/bar)"
        if let Some(backend) = self.backend {
            write!(f, "[{backend}] ")?;
        }

        let kind_str = match self.kind {
            SourceErrorKind::NotFound => "Not found",
            SourceErrorKind::PermissionDenied => "Permission denied",
            SourceErrorKind::InvalidEncoding => "Invalid encoding",
            SourceErrorKind::InvalidPattern => "Invalid pattern",
            SourceErrorKind::Other => "Error",
        };

        write!(f, "{kind_str}")?;

        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }

        if let Some(path) = &self.path {
            write!(f, " (path: {})", path.display())?;
        }

        Ok(())
    }
}

impl std::error::Error for SourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|s| s.as_ref() as &(dyn std::error::Error + 'static))
    }
}
