//! Page store and navigation resolver for tagdoc.
//!
//! This crate provides:
//! - [`Page`]: a compiled block with a reference, title and route
//! - [`PageStore`]: reference-keyed storage with duplicate warnings
//! - Navigation tree building from `@page` and heading directives
//! - Route computation and `@include` splicing
//!
//! # Resolution order
//!
//! Includes must be spliced before the tree is built (an included page may
//! carry `@page` directives), and routes can only be computed once the tree
//! exists. [`PageStore::resolve`] runs the passes in that order and consumes
//! the store:
//!
//! ```text
//! populated ─► includes resolved ─► tree built ─► routes resolved ─► ResolvedPages
//! ```
//!
//! # Quick Start
//!
//! ```
//! use tagdoc_compiler::Compiler;
//! use tagdoc_pages::{Page, PageStore};
//!
//! let compiler = Compiler::new("/docs");
//! let mut store = PageStore::new(compiler.diagnostics().clone());
//!
//! for (name, text) in [("_nav", "@page guide"), ("guide", "@# Guide\n@## Setup")] {
//!     let block = compiler.render_block(text, &[] as &[&str]).unwrap();
//!     let page = Page::from_block(block, format!("{name}.md"), name);
//!     store.insert(page);
//! }
//!
//! let resolved = store.resolve("_nav").unwrap();
//! assert_eq!(resolved.pages["guide"].route, "guide");
//! ```

mod error;
mod includes;
mod nav;
mod page;
mod routes;
mod store;

pub use error::PageError;
pub use nav::{NavHeading, NavNode, PageNode};
pub use page::{Page, UNTITLED};
pub use routes::slugify;
pub use store::{DEFAULT_NAV_ROOT, PageStore, ResolvedPages};
