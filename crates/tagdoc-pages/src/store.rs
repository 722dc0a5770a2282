//! Reference-keyed page storage and the resolution pipeline.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::Serialize;
use tagdoc_compiler::{Diagnostics, Warning, WarningKind};

use crate::error::PageError;
use crate::nav::NavNode;
use crate::page::Page;

/// Reference of the page whose `@page` directives define the top level.
pub const DEFAULT_NAV_ROOT: &str = "_nav";

/// Pages of one compilation run.
///
/// The store exclusively owns its pages. A new store is created for every
/// run and discarded once [`resolve`](Self::resolve) has produced the export.
pub struct PageStore {
    pub(crate) pages: HashMap<String, Page>,
    diagnostics: Arc<dyn Diagnostics>,
}

impl PageStore {
    /// Create an empty store reporting duplicates to `diagnostics`.
    #[must_use]
    pub fn new(diagnostics: Arc<dyn Diagnostics>) -> Self {
        Self {
            pages: HashMap::new(),
            diagnostics,
        }
    }

    /// Insert or overwrite a page.
    ///
    /// Overwriting emits a [`WarningKind::DuplicateReference`] warning; the
    /// new page wins.
    pub fn set(&mut self, reference: impl Into<String>, page: Page) {
        let reference = reference.into();
        if let Some(previous) = self.pages.get(&reference) {
            self.diagnostics.warn(Warning::new(
                WarningKind::DuplicateReference,
                format!(
                    "Duplicate page reference `{reference}`: {} replaces {}",
                    page.source_path, previous.source_path
                ),
            ));
        }
        self.pages.insert(reference, page);
    }

    /// Insert a page under its own reference.
    pub fn insert(&mut self, page: Page) {
        self.set(page.reference.clone(), page);
    }

    /// Get page by reference.
    #[must_use]
    pub fn get(&self, reference: &str) -> Option<&Page> {
        self.pages.get(reference)
    }

    /// Remove a page, returning it if present.
    pub fn remove(&mut self, reference: &str) -> Option<Page> {
        self.pages.remove(reference)
    }

    /// Iterate over all pages.
    ///
    /// Iteration order is unspecified.
    pub fn all(&self) -> impl Iterator<Item = &Page> {
        self.pages.values()
    }

    /// Number of stored pages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Returns `true` if no pages are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Run every resolution pass in order and export the result.
    ///
    /// Splices includes, builds the navigation tree from `nav_root`, then
    /// computes routes for the tree and for every stored page.
    ///
    /// # Errors
    ///
    /// Returns [`PageError`] if the nav root, a `@page` target or an
    /// `@include` target is missing, or if pages form a cycle.
    pub fn resolve(mut self, nav_root: &str) -> Result<ResolvedPages, PageError> {
        self.resolve_includes()?;
        let mut tree = self.build_tree(nav_root, 0)?;
        self.resolve_routes(&mut tree);

        tracing::debug!(pages = self.pages.len(), nav_root, "Pages resolved");

        Ok(ResolvedPages {
            pages: self.pages.into_iter().collect(),
            nav: tree.children,
        })
    }
}

/// Read-only export of a resolved store.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResolvedPages {
    /// Pages keyed by reference, sorted for stable output.
    pub pages: BTreeMap<String, Page>,
    /// Top-level navigation entries: the children of the nav page.
    pub nav: Vec<NavNode>,
}
