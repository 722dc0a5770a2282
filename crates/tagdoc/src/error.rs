//! CLI error types.

use tagdoc_aggregator::AggregatorError;
use tagdoc_config::ConfigError;
use tagdoc_source::SourceError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Source(#[from] SourceError),

    #[error("{0}")]
    Aggregator(#[from] AggregatorError),

    #[error("Failed to write output: {0}")]
    Json(#[from] serde_json::Error),
}
