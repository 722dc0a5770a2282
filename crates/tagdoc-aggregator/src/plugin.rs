//! Plugin contract.

use tagdoc_compiler::Compiler;
use tagdoc_source::SourceFile;

use crate::error::PluginError;

/// Plugin output: a flat object whose keys become document keys.
pub type Output = serde_json::Map<String, serde_json::Value>;

/// A compiler for one kind of source file.
///
/// Implementations must be `Send + Sync`: the aggregator runs plugins of
/// the same run on different threads. A plugin that waits on external
/// resources (a package registry, a subprocess) blocks only its own thread.
pub trait Plugin: Send + Sync {
    /// Name used in logs and error messages.
    fn name(&self) -> &str;

    /// Compile the files matched by this plugin's pattern.
    ///
    /// `files` may be empty. The returned keys are merged into the
    /// composite document as-is.
    fn compile(
        &self,
        files: &[&dyn SourceFile],
        compiler: &Compiler,
    ) -> Result<Output, PluginError>;
}
