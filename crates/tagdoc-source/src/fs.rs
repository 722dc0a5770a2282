//! Filesystem source files.
//!
//! Provides [`FsFile`] for reading documents from the local filesystem and
//! [`collect_files`] for expanding glob patterns relative to a root directory.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::file::{SourceError, SourceErrorKind, SourceFile};

/// Backend identifier for error messages.
const BACKEND: &str = "Fs";

/// A file on the local filesystem.
///
/// Content is read on every call to [`SourceFile::read`]; nothing is cached.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct FsFile {
    path: PathBuf,
}

impl FsFile {
    /// Create a file record for an absolute path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SourceFile for FsFile {
    fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<String, SourceError> {
        fs::read_to_string(&self.path)
            .map_err(|e| SourceError::io(e, &self.path).with_backend(BACKEND))
    }
}

/// Expand glob patterns into a sorted, de-duplicated list of files.
///
/// Relative patterns are resolved against `root`. Directories are skipped.
/// Entries that cannot be inspected (e.g., permission denied while walking)
/// are logged and skipped rather than failing the whole scan.
///
/// # Errors
///
/// Returns [`SourceError`] with [`SourceErrorKind::InvalidPattern`] if a
/// pattern cannot be parsed, or an I/O error if `root` cannot be resolved.
pub fn collect_files(root: &Path, patterns: &[String]) -> Result<Vec<FsFile>, SourceError> {
    let root = std::path::absolute(root).map_err(|e| SourceError::io(e, root))?;
    let mut found = BTreeSet::new();

    for pattern in patterns {
        let full = if Path::new(pattern).is_absolute() {
            PathBuf::from(pattern)
        } else {
            root.join(pattern)
        };
        let full = full.to_string_lossy();

        let entries = glob::glob(&full).map_err(|e| {
            SourceError::new(SourceErrorKind::InvalidPattern)
                .with_backend(BACKEND)
                .with_path(pattern)
                .with_source(e)
        })?;

        let mut matched = 0usize;
        for entry in entries {
            match entry {
                Ok(path) if path.is_file() => {
                    found.insert(path);
                    matched += 1;
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(path = %e.path().display(), error = %e.error(), "Skipping unreadable entry");
                }
            }
        }

        tracing::debug!(pattern = %pattern, matched, "Pattern expanded");
    }

    Ok(found.into_iter().map(FsFile::new).collect())
}
