//! Directive tag parsing.
//!
//! A directive is a whole line of the form `@name` or `@name value`. Every
//! other line is prose. Consecutive prose lines stay together in a single
//! [`ContentNode::Text`] so that markdown constructs spanning several lines
//! (fenced code, lists, tables) reach the renderer intact.

use std::sync::LazyLock;

use regex::Regex;

use crate::block::{ContentNode, HeadingNode, TagNode};

/// Deepest heading directive (`@######`).
///
/// Longer runs of `#` are kept as generic tags.
pub const MAX_HEADING_LEVEL: usize = 6;

static TAG_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^@(\S+)(?:\s+(.*))?$").unwrap());

/// Split a body into prose and directive nodes.
///
/// Tags whose name is listed in `reserved` are treated as prose, which keeps
/// code samples like `@media` or `@import` intact. Prose is returned raw;
/// rendering happens in [`Compiler::render_block`](crate::Compiler::render_block).
pub fn parse_tags<S: AsRef<str>>(raw_body: &str, reserved: &[S]) -> Vec<ContentNode> {
    let mut nodes = Vec::new();
    let mut prose: Vec<&str> = Vec::new();

    for line in raw_body.lines() {
        let Some(caps) = TAG_LINE.captures(line) else {
            prose.push(line);
            continue;
        };

        let name = &caps[1];
        if reserved.iter().any(|r| r.as_ref() == name) {
            prose.push(line);
            continue;
        }

        if !prose.is_empty() {
            nodes.push(ContentNode::Text(prose.join("\n")));
            prose.clear();
        }

        let value = caps.get(2).map_or("", |m| m.as_str().trim_end());
        nodes.push(classify(name, value));
    }

    if !prose.is_empty() {
        nodes.push(ContentNode::Text(prose.join("\n")));
    }

    nodes
}

fn classify(name: &str, value: &str) -> ContentNode {
    let is_heading = name.len() <= MAX_HEADING_LEVEL && name.bytes().all(|b| b == b'#');
    if is_heading {
        // Bounded by MAX_HEADING_LEVEL, always fits.
        #[allow(clippy::cast_possible_truncation)]
        let level = name.len() as u8;
        ContentNode::Heading(HeadingNode::new(level, value))
    } else {
        ContentNode::Tag(TagNode::new(name, value))
    }
}
