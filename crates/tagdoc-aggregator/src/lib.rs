//! Plugin aggregation for tagdoc.
//!
//! An [`Aggregator`] owns an ordered list of `(pattern, plugin)`
//! registrations. [`Aggregator::run`] hands every plugin the files matching
//! its pattern together with one shared [`Compiler`](tagdoc_compiler::Compiler),
//! then shallow-merges the plugin outputs into a single JSON object.
//!
//! Plugins run concurrently on the rayon thread pool, but their outputs are
//! merged in registration order. When two plugins return the same top-level
//! key, the later registration wins and an
//! [`OutputKeyCollision`](tagdoc_compiler::WarningKind::OutputKeyCollision)
//! warning is reported.
//!
//! # Example
//!
//! ```ignore
//! use tagdoc_aggregator::Aggregator;
//! use tagdoc_compiler::Compiler;
//!
//! let document = Aggregator::new(Compiler::new("/docs"))
//!     .register("**/*.md", PagesPlugin::default())?
//!     .register("**/*.css", StyleGuidePlugin::default())?
//!     .run(&files)?;
//! ```

mod aggregator;
mod error;
mod plugin;

pub use aggregator::Aggregator;
pub use error::{AggregatorError, PluginError};
pub use plugin::{Output, Plugin};
