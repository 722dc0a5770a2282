//! YAML front matter extraction.
//!
//! Front matter is only recognized at the very start of the text:
//!
//! ```text
//! ---
//! key: value
//! ---
//! body...
//! ```
//!
//! Both delimiter lines must be exactly `---` and the closing one must be
//! followed by a newline.

use std::sync::LazyLock;

use regex::Regex;

use crate::block::Metadata;
use crate::error::CompileError;

static FRONT_MATTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\A---\r?\n(.*?\r?\n)?---\r?\n").unwrap());

/// Split leading front matter from a text.
///
/// Returns `({}, text)` unchanged when no front matter block starts the text.
/// A blank front matter region yields an empty mapping. The returned body has
/// the whole delimited block removed but is otherwise untouched.
///
/// # Errors
///
/// Returns [`CompileError::FrontMatter`] if the region is not a YAML mapping
/// with string keys.
pub fn extract_metadata(text: &str) -> Result<(Metadata, &str), CompileError> {
    let Some(caps) = FRONT_MATTER.captures(text) else {
        return Ok((Metadata::new(), text));
    };

    let body = &text[caps.get(0).map_or(0, |m| m.end())..];
    let region = caps.get(1).map_or("", |m| m.as_str());

    if region.trim().is_empty() {
        return Ok((Metadata::new(), body));
    }

    let metadata = serde_yaml::from_str::<Metadata>(region).map_err(CompileError::FrontMatter)?;
    Ok((metadata, body))
}
