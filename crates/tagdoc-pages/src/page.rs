//! Page record.

use serde::Serialize;
use tagdoc_compiler::{Block, ContentNode, Metadata};

/// Title used when a page has neither `metadata.title` nor a heading.
pub const UNTITLED: &str = "untitled";

/// A compiled documentation page.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    /// Unique key (file stem unless overridden by `metadata.reference`).
    pub reference: String,
    /// Fully-qualified route. Empty until routes are resolved.
    pub route: String,
    /// Source file path, relative to the project root.
    pub source_path: String,
    /// Display title.
    pub title: String,
    /// Front matter.
    pub metadata: Metadata,
    /// Body without front matter.
    pub raw_body: String,
    /// Rendered prose and directives.
    pub contents: Vec<ContentNode>,
}

impl Page {
    /// Build a page from a compiled block.
    ///
    /// # Arguments
    ///
    /// * `block` - Compiled file content
    /// * `source_path` - Path shown in the output (usually project-relative)
    /// * `default_reference` - Reference used when the front matter has none
    ///
    /// Title resolution: `metadata.title` > first heading > [`UNTITLED`].
    #[must_use]
    pub fn from_block(
        block: Block,
        source_path: impl Into<String>,
        default_reference: &str,
    ) -> Self {
        let reference = metadata_str(&block.metadata, "reference")
            .unwrap_or(default_reference)
            .to_owned();

        let title = metadata_str(&block.metadata, "title")
            .or_else(|| {
                block
                    .contents
                    .iter()
                    .find_map(ContentNode::as_heading)
                    .map(|h| h.raw_value.as_str())
            })
            .unwrap_or(UNTITLED)
            .to_owned();

        Self {
            reference,
            route: String::new(),
            source_path: source_path.into(),
            title,
            metadata: block.metadata,
            raw_body: block.raw_body,
            contents: block.contents,
        }
    }
}

fn metadata_str<'a>(metadata: &'a Metadata, key: &str) -> Option<&'a str> {
    metadata.get(key).and_then(serde_json::Value::as_str)
}
