//! Tag-block compiler for tagdoc.
//!
//! A documentation block is a piece of text with an optional YAML front
//! matter header, markdown prose, and `@directive` lines. This crate turns
//! such a block into a [`Block`]:
//!
//! ```text
//! ---
//! title: Buttons            ─► metadata
//! ---
//! # Buttons                 ─► prose (rendered to HTML)
//! @page button-groups       ─► Tag { tagName: "page", rawValue: "button-groups" }
//! @## Variants              ─► Heading { level: 2, rawValue: "Variants", route: "" }
//! ```
//!
//! # Quick Start
//!
//! ```
//! use tagdoc_compiler::{Compiler, ContentNode};
//!
//! let compiler = Compiler::new("/docs");
//! let block = compiler.render_block("intro\n@tag value\nmore", &[] as &[&str]).unwrap();
//! assert_eq!(block.contents.len(), 3);
//! assert!(matches!(block.contents[1], ContentNode::Tag(_)));
//! ```
//!
//! The [`Compiler`] is immutable after construction and is shared by every
//! plugin of a run, so rendering options stay consistent across file types.
//! Warnings are reported through an injected [`Diagnostics`] sink.

mod block;
mod compiler;
mod diagnostics;
mod error;
mod front_matter;
mod markdown;
mod tags;

pub use block::{Block, ContentNode, HeadingNode, Metadata, TagNode};
pub use compiler::{Compiler, objectify};
pub use diagnostics::{
    CollectingDiagnostics, Diagnostics, TracingDiagnostics, Warning, WarningKind,
};
pub use error::CompileError;
pub use front_matter::extract_metadata;
pub use markdown::{HtmlRenderer, MarkdownOptions, MarkdownRenderer};
pub use tags::{MAX_HEADING_LEVEL, parse_tags};
