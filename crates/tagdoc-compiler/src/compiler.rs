//! Shared compiler instance handed to every plugin.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rayon::prelude::*;

use crate::block::{Block, ContentNode};
use crate::diagnostics::{Diagnostics, TracingDiagnostics};
use crate::error::CompileError;
use crate::front_matter::extract_metadata;
use crate::markdown::{HtmlRenderer, MarkdownOptions, MarkdownRenderer};
use crate::tags::parse_tags;

/// Tag-block compiler.
///
/// Holds only fixed configuration captured at construction: the markdown
/// renderer, the root directory used for relative paths, and the warning
/// sink. It is `Send + Sync` and can be shared by reference across plugins
/// running on different threads.
#[derive(Clone)]
pub struct Compiler {
    root: PathBuf,
    renderer: Arc<dyn MarkdownRenderer>,
    diagnostics: Arc<dyn Diagnostics>,
}

impl Compiler {
    /// Create a compiler with the default HTML renderer and tracing diagnostics.
    ///
    /// # Arguments
    ///
    /// * `root` - Directory that [`relative_path`](Self::relative_path) is computed against
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            renderer: Arc::new(HtmlRenderer::default()),
            diagnostics: Arc::new(TracingDiagnostics),
        }
    }

    /// Use the default HTML renderer with custom parser options.
    #[must_use]
    pub fn with_markdown_options(self, options: MarkdownOptions) -> Self {
        self.with_renderer(Arc::new(HtmlRenderer::new(options)))
    }

    /// Replace the markdown renderer.
    #[must_use]
    pub fn with_renderer(mut self, renderer: Arc<dyn MarkdownRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    /// Replace the warning sink.
    #[must_use]
    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn Diagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Warning sink shared by everything that runs with this compiler.
    #[must_use]
    pub fn diagnostics(&self) -> &Arc<dyn Diagnostics> {
        &self.diagnostics
    }

    /// Root directory for relative paths.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Render a markdown fragment to HTML.
    #[must_use]
    pub fn render_markdown(&self, markdown: &str) -> String {
        self.renderer.render(markdown)
    }

    /// Compile one text block.
    ///
    /// Extracts front matter, trims the remaining body, splits it into prose
    /// and directive nodes, and renders every prose segment. Segments that
    /// render to blank HTML are dropped; node order is preserved.
    ///
    /// # Arguments
    ///
    /// * `text` - Raw block text
    /// * `reserved` - Tag names to treat as prose
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::FrontMatter`] if the front matter is malformed.
    pub fn render_block<S: AsRef<str>>(
        &self,
        text: &str,
        reserved: &[S],
    ) -> Result<Block, CompileError> {
        let (metadata, body) = extract_metadata(text)?;
        let raw_body = body.trim();
        let contents = self.render_contents(parse_tags(raw_body, reserved));

        Ok(Block {
            metadata,
            raw_body: raw_body.to_owned(),
            contents,
        })
    }

    fn render_contents(&self, nodes: Vec<ContentNode>) -> Vec<ContentNode> {
        nodes
            .into_par_iter()
            .filter_map(|node| match node {
                ContentNode::Text(markdown) => {
                    let html = self.renderer.render(&markdown);
                    (!html.trim().is_empty()).then_some(ContentNode::Text(html))
                }
                other => Some(other),
            })
            .collect()
    }

    /// Build a key to item map. See [`objectify`].
    pub fn objectify<T, K, F>(&self, items: impl IntoIterator<Item = T>, key_fn: F) -> BTreeMap<String, T>
    where
        K: Into<String>,
        F: Fn(&T) -> K,
    {
        objectify(items, key_fn)
    }

    /// Path relative to the compiler root, with `/` separators.
    ///
    /// Paths outside the root are returned as-is.
    #[must_use]
    pub fn relative_path(&self, path: &Path) -> String {
        let Ok(relative) = path.strip_prefix(&self.root) else {
            return path.to_string_lossy().into_owned();
        };

        relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}

impl std::fmt::Debug for Compiler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compiler")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

/// Build a key to item map from a sequence.
///
/// Later items silently overwrite earlier ones with the same key; callers
/// that need collision warnings must check before inserting.
pub fn objectify<T, K, F>(items: impl IntoIterator<Item = T>, key_fn: F) -> BTreeMap<String, T>
where
    K: Into<String>,
    F: Fn(&T) -> K,
{
    items
        .into_iter()
        .map(|item| (key_fn(&item).into(), item))
        .collect()
}
