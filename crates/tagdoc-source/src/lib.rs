//! Source file abstraction for the tagdoc documentation compiler.
//!
//! Plugins never touch the filesystem directly. They receive a list of
//! [`SourceFile`] records, each exposing an absolute path and lazy,
//! synchronous access to the full text content.
//!
//! # Architecture
//!
//! The crate provides:
//! - [`SourceFile`] trait with `path()` and `read()` methods
//! - [`FsFile`] backed by the local filesystem
//! - [`collect_files`] for expanding glob patterns into [`FsFile`] records
//! - [`MemoryFile`] for testing (behind `mock` feature flag)
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use tagdoc_source::{SourceFile, collect_files};
//!
//! let files = collect_files(Path::new("docs"), &["**/*.md".to_owned()])?;
//! for file in &files {
//!     println!("{}: {} bytes", file.path().display(), file.read()?.len());
//! }
//! ```

mod file;
mod fs;
#[cfg(feature = "mock")]
mod mock;

pub use file::{SourceError, SourceErrorKind, SourceFile};
pub use fs::{FsFile, collect_files};
#[cfg(feature = "mock")]
pub use mock::MemoryFile;
