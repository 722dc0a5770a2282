//! Compiled block data model.

use serde::Serialize;

/// Front matter metadata, keyed by YAML mapping key.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Compiled form of one raw documentation unit.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    /// Parsed front matter (empty when the text has none).
    pub metadata: Metadata,
    /// Body text with front matter stripped and surrounding whitespace trimmed.
    pub raw_body: String,
    /// Rendered prose and directive nodes, in source order.
    pub contents: Vec<ContentNode>,
}

/// One entry of a block's content array.
///
/// Serializes untagged: prose is a bare HTML string, tags are objects with a
/// `tagName` discriminant (`"heading"` for headings).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ContentNode {
    /// Prose. Raw markdown straight out of [`parse_tags`](crate::parse_tags),
    /// rendered HTML once the block has been compiled.
    Text(String),
    /// `@#`..`@######` directive.
    Heading(HeadingNode),
    /// Any other `@name value` directive.
    Tag(TagNode),
}

impl ContentNode {
    /// Returns the tag if this node is a generic tag with the given name.
    #[must_use]
    pub fn tag_named(&self, name: &str) -> Option<&TagNode> {
        match self {
            Self::Tag(tag) if tag.tag_name == name => Some(tag),
            _ => None,
        }
    }

    /// Returns the heading if this node is one.
    #[must_use]
    pub fn as_heading(&self) -> Option<&HeadingNode> {
        match self {
            Self::Heading(heading) => Some(heading),
            _ => None,
        }
    }
}

/// Generic directive tag.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagNode {
    /// Directive name without the leading `@`.
    pub tag_name: String,
    /// Rest of the line after the name (empty when absent).
    pub raw_value: String,
}

impl TagNode {
    /// Create a tag node.
    #[must_use]
    pub fn new(tag_name: impl Into<String>, raw_value: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            raw_value: raw_value.into(),
        }
    }
}

/// Heading directive (`@##  Title`).
///
/// `route` is empty until the navigation resolver fills it in.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "tagName", rename = "heading", rename_all = "camelCase")]
pub struct HeadingNode {
    /// Number of `#` characters (1-6).
    pub level: u8,
    /// Heading text.
    pub raw_value: String,
    /// Fully-qualified route, resolved later.
    pub route: String,
}

impl HeadingNode {
    /// Create an unresolved heading.
    #[must_use]
    pub fn new(level: u8, raw_value: impl Into<String>) -> Self {
        Self {
            level,
            raw_value: raw_value.into(),
            route: String::new(),
        }
    }
}
