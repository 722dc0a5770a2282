//! Style guide plugin.
//!
//! Style sheets document their components in `/** ... */` comments:
//!
//! ```css
//! /**
//!  * @# Buttons
//!  * Primary actions.
//!  *
//!  * ```html
//!  * <button class="btn">Save</button>
//!  * ```
//!  */
//! .btn { ... }
//! ```
//!
//! Each comment becomes a [`StyleSection`]. The leading ` * ` gutter is
//! removed before the comment is compiled, and CSS at-rules are reserved
//! so that `@media` and friends stay prose.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use pulldown_cmark::{CodeBlockKind, Event, Parser, Tag, TagEnd};
use rayon::prelude::*;
use regex::Regex;
use serde::Serialize;
use tagdoc_aggregator::{Output, Plugin, PluginError};
use tagdoc_compiler::{Compiler, ContentNode, Metadata, Warning, WarningKind};
use tagdoc_pages::{UNTITLED, slugify};
use tagdoc_source::SourceFile;

use crate::file_stem;

/// At-rules kept as prose by default.
pub const DEFAULT_AT_RULES: &[&str] = &[
    "charset",
    "container",
    "each",
    "else",
    "extend",
    "font-face",
    "for",
    "forward",
    "function",
    "if",
    "import",
    "include",
    "keyframes",
    "layer",
    "media",
    "mixin",
    "namespace",
    "return",
    "supports",
    "use",
    "while",
];

static DOC_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)/\*\*(?:([^*/].*?))?\*/").unwrap());

static GUTTER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^[ \t]*\*[ \t]?").unwrap());

/// One documented section of a style sheet.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleSection {
    /// `metadata.reference`, else the slug of the first heading, else
    /// `<file stem>-<n>`.
    pub reference: String,
    pub title: String,
    pub source_path: String,
    /// Line of the opening `/**`, 1-based.
    pub line: usize,
    pub metadata: Metadata,
    pub contents: Vec<ContentNode>,
    /// Sources of fenced `html` code blocks, in order.
    pub examples: Vec<String>,
}

/// Compiles documentation comments of CSS, SCSS and LESS files.
///
/// Output key: `styleguide` (reference to section). Sections sharing a
/// reference are reported as duplicates; the later one wins.
#[derive(Clone, Debug)]
pub struct StyleGuidePlugin {
    reserved: Vec<String>,
}

impl Default for StyleGuidePlugin {
    fn default() -> Self {
        Self {
            reserved: DEFAULT_AT_RULES.iter().map(|&r| r.to_owned()).collect(),
        }
    }
}

impl StyleGuidePlugin {
    /// Replace the reserved at-rule names.
    #[must_use]
    pub fn with_reserved(mut self, reserved: Vec<String>) -> Self {
        self.reserved = reserved;
        self
    }

    fn compile_file(
        &self,
        file: &dyn SourceFile,
        compiler: &Compiler,
    ) -> Result<Vec<StyleSection>, PluginError> {
        let text = file.read()?;
        let source_path = compiler.relative_path(file.path());
        let stem = file_stem(file.path());

        let mut sections = Vec::new();
        for captures in DOC_COMMENT.captures_iter(&text) {
            let Some(inner) = captures.get(1) else {
                continue;
            };
            let body = strip_gutter(inner.as_str());
            let body = body.trim();
            if body.is_empty() {
                continue;
            }

            let start = captures.get(0).map_or(0, |m| m.start());
            let line = text[..start].matches('\n').count() + 1;

            // Front matter needs the newline after its closing delimiter.
            let block = compiler
                .render_block(&format!("{body}\n"), &self.reserved)
                .map_err(|source| PluginError::Compile {
                    path: format!("{source_path}:{line}"),
                    source,
                })?;

            let first_heading = block
                .contents
                .iter()
                .find_map(ContentNode::as_heading)
                .map(|h| h.raw_value.clone());

            let reference = metadata_str(&block.metadata, "reference")
                .map(str::to_owned)
                .or_else(|| first_heading.as_deref().map(slugify))
                .unwrap_or_else(|| format!("{stem}-{}", sections.len() + 1));
            let title = metadata_str(&block.metadata, "title")
                .map(str::to_owned)
                .or(first_heading)
                .unwrap_or_else(|| UNTITLED.to_owned());

            sections.push(StyleSection {
                reference,
                title,
                source_path: source_path.clone(),
                line,
                examples: html_examples(&block.raw_body),
                metadata: block.metadata,
                contents: block.contents,
            });
        }

        Ok(sections)
    }
}

impl Plugin for StyleGuidePlugin {
    fn name(&self) -> &str {
        "styleguide"
    }

    fn compile(&self, files: &[&dyn SourceFile], compiler: &Compiler) -> Result<Output, PluginError> {
        let per_file = files
            .par_iter()
            .map(|file| self.compile_file(*file, compiler))
            .collect::<Result<Vec<_>, _>>()?;

        let mut sections: BTreeMap<String, StyleSection> = BTreeMap::new();
        for section in per_file.into_iter().flatten() {
            if let Some(previous) = sections.get(&section.reference) {
                compiler.diagnostics().warn(Warning::new(
                    WarningKind::DuplicateReference,
                    format!(
                        "Duplicate style guide reference `{}`: {}:{} replaces {}:{}",
                        section.reference,
                        section.source_path,
                        section.line,
                        previous.source_path,
                        previous.line
                    ),
                ));
            }
            sections.insert(section.reference.clone(), section);
        }

        tracing::info!(sections = sections.len(), "Compiled style guide");

        let mut output = Output::new();
        output.insert(
            "styleguide".to_owned(),
            serde_json::to_value(&sections).map_err(PluginError::custom)?,
        );
        Ok(output)
    }
}

/// Remove the ` * ` gutter when every non-blank line after the opening one
/// carries it. Comments without a gutter are returned unchanged, so their
/// `* item` bullets survive.
fn strip_gutter(comment: &str) -> String {
    let mut continuation = comment.lines().skip(1).filter(|l| !l.trim().is_empty()).peekable();
    let guttered =
        continuation.peek().is_some() && continuation.all(|l| l.trim_start().starts_with('*'));

    if guttered {
        GUTTER.replace_all(comment, "").into_owned()
    } else {
        comment.to_owned()
    }
}

fn metadata_str<'a>(metadata: &'a Metadata, key: &str) -> Option<&'a str> {
    metadata.get(key).and_then(serde_json::Value::as_str)
}

/// Collect the sources of fenced code blocks tagged `html`.
fn html_examples(markdown: &str) -> Vec<String> {
    let mut examples = Vec::new();
    let mut current: Option<String> = None;

    for event in Parser::new(markdown) {
        match event {
            Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info)))
                if info.split_whitespace().next() == Some("html") =>
            {
                current = Some(String::new());
            }
            Event::Text(text) => {
                if let Some(source) = current.as_mut() {
                    source.push_str(&text);
                }
            }
            Event::End(TagEnd::CodeBlock) => {
                if let Some(source) = current.take() {
                    examples.push(source);
                }
            }
            _ => {}
        }
    }

    examples
}
