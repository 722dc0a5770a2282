//! Built-in plugins for tagdoc.
//!
//! - [`PagesPlugin`]: markdown pages, navigation tree and routes
//!   (output keys `pages` and `nav`)
//! - [`StyleGuidePlugin`]: `/** ... */` documentation comments in style
//!   sheets (output key `styleguide`)
//! - [`PackagesPlugin`]: `package.json` manifests, optionally enriched from
//!   a package registry (output key `packages`)
//!
//! Every plugin compiles its files with the shared
//! [`Compiler`](tagdoc_compiler::Compiler) and reports non-fatal problems
//! through the compiler's diagnostics sink.

mod packages;
mod pages;
mod registry;
mod styleguide;

use std::path::Path;

pub use packages::{Package, PackagesPlugin};
pub use pages::PagesPlugin;
pub use registry::{HttpRegistry, RegistryClient, RegistryError, RegistryInfo};
pub use styleguide::{DEFAULT_AT_RULES, StyleGuidePlugin, StyleSection};

/// File name without its extension.
fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Borrow a slice of concrete files as trait objects.
#[cfg(test)]
fn as_sources<F: tagdoc_source::SourceFile>(files: &[F]) -> Vec<&dyn tagdoc_source::SourceFile> {
    files.iter().map(|f| f as &dyn tagdoc_source::SourceFile).collect()
}
