//! Error types for plugins and the aggregator.

use tagdoc_compiler::CompileError;
use tagdoc_source::SourceError;

/// Failure inside a single plugin.
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    /// A block in `path` could not be compiled.
    #[error("Failed to compile {path}: {source}")]
    Compile {
        path: String,
        #[source]
        source: CompileError,
    },
    /// A source file could not be read.
    #[error(transparent)]
    Read(#[from] SourceError),
    /// A source file has content the plugin cannot interpret.
    #[error("Invalid {path}: {message}")]
    Invalid { path: String, message: String },
    /// Plugin-specific failure.
    #[error(transparent)]
    Custom(Box<dyn std::error::Error + Send + Sync>),
}

impl PluginError {
    /// Wrap a plugin-specific error.
    pub fn custom(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Custom(Box::new(err))
    }
}

/// Aggregator failure.
#[derive(Debug, thiserror::Error)]
pub enum AggregatorError {
    /// A registration pattern is not a valid glob.
    #[error("Invalid pattern `{pattern}`: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
    /// A plugin failed and the run was aborted.
    #[error("Plugin `{plugin}` failed: {source}")]
    Plugin {
        plugin: String,
        #[source]
        source: PluginError,
    },
}
