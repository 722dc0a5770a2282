//! In-memory source files for testing.
//!
//! Provides [`MemoryFile`] for unit testing without filesystem access.

use std::path::{Path, PathBuf};

use crate::file::{SourceError, SourceFile};

/// Source file backed by an in-memory string.
///
/// # Example
///
/// ```ignore
/// use tagdoc_source::{MemoryFile, SourceFile};
///
/// let file = MemoryFile::new("/docs/guide.md", "# Guide");
/// assert_eq!(file.read().unwrap(), "# Guide");
/// ```
#[derive(Clone, Debug)]
pub struct MemoryFile {
    path: PathBuf,
    content: Option<String>,
}

impl MemoryFile {
    /// Create a file with the given path and content.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: Some(content.into()),
        }
    }

    /// Create a file whose `read()` always fails with a not found error.
    #[must_use]
    pub fn missing(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            content: None,
        }
    }
}

impl SourceFile for MemoryFile {
    fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<String, SourceError> {
        self.content
            .clone()
            .ok_or_else(|| SourceError::not_found(&self.path).with_backend("Memory"))
    }
}
