//! Compiler error types.

/// Error returned when a block cannot be compiled.
///
/// The compiler has no file context; callers attach the source path when
/// reporting (see the plugin error types).
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    /// Front matter is not a valid YAML mapping.
    #[error("Invalid front matter: {0}")]
    FrontMatter(#[source] serde_yaml::Error),
}
