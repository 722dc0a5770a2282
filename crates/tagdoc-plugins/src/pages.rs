//! Documentation pages plugin.

use std::sync::Arc;

use rayon::prelude::*;
use tagdoc_aggregator::{Output, Plugin, PluginError};
use tagdoc_compiler::Compiler;
use tagdoc_pages::{DEFAULT_NAV_ROOT, Page, PageStore};
use tagdoc_source::SourceFile;

use crate::file_stem;

/// Compiles markdown pages into a page map and a navigation tree.
///
/// Every matched file becomes one [`Page`] whose default reference is the
/// file stem. The pages are then resolved from the nav root page:
/// includes, tree, routes. Output keys: `pages` and `nav`. With no matched
/// files the plugin contributes nothing.
#[derive(Clone, Debug)]
pub struct PagesPlugin {
    nav_root: String,
    reserved: Vec<String>,
}

impl Default for PagesPlugin {
    fn default() -> Self {
        Self {
            nav_root: DEFAULT_NAV_ROOT.to_owned(),
            reserved: Vec::new(),
        }
    }
}

impl PagesPlugin {
    /// Use a different nav root reference.
    #[must_use]
    pub fn with_nav_root(mut self, nav_root: impl Into<String>) -> Self {
        self.nav_root = nav_root.into();
        self
    }

    /// Tag names kept as prose.
    #[must_use]
    pub fn with_reserved(mut self, reserved: Vec<String>) -> Self {
        self.reserved = reserved;
        self
    }

    fn compile_page(&self, file: &dyn SourceFile, compiler: &Compiler) -> Result<Page, PluginError> {
        let text = file.read()?;
        let source_path = compiler.relative_path(file.path());
        let block = compiler
            .render_block(&text, &self.reserved)
            .map_err(|source| PluginError::Compile {
                path: source_path.clone(),
                source,
            })?;

        Ok(Page::from_block(block, source_path, &file_stem(file.path())))
    }
}

impl Plugin for PagesPlugin {
    fn name(&self) -> &str {
        "pages"
    }

    fn compile(&self, files: &[&dyn SourceFile], compiler: &Compiler) -> Result<Output, PluginError> {
        if files.is_empty() {
            tracing::debug!("No page files matched");
            return Ok(Output::new());
        }

        let pages = files
            .par_iter()
            .map(|file| self.compile_page(*file, compiler))
            .collect::<Result<Vec<_>, _>>()?;

        let mut store = PageStore::new(Arc::clone(compiler.diagnostics()));
        for page in pages {
            store.insert(page);
        }

        let resolved = store.resolve(&self.nav_root).map_err(PluginError::custom)?;
        tracing::info!(pages = resolved.pages.len(), "Compiled pages");

        let mut output = Output::new();
        output.insert(
            "pages".to_owned(),
            serde_json::to_value(&resolved.pages).map_err(PluginError::custom)?,
        );
        output.insert(
            "nav".to_owned(),
            serde_json::to_value(&resolved.nav).map_err(PluginError::custom)?,
        );
        Ok(output)
    }
}
