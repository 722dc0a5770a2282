//! Status lines printed around a build.

use console::{Style, Term};

/// Build status reporter.
///
/// Everything goes to stderr; stdout is reserved for the compiled document.
pub(crate) struct Output {
    stderr: Term,
    done: Style,
    failed: Style,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            stderr: Term::stderr(),
            done: Style::new().green(),
            failed: Style::new().red(),
        }
    }

    /// Report a finished build.
    pub(crate) fn success(&self, msg: &str) {
        let _ = self.stderr.write_line(&self.done.apply_to(msg).to_string());
    }

    /// Report why the build stopped.
    pub(crate) fn error(&self, msg: &str) {
        let _ = self.stderr.write_line(&self.failed.apply_to(msg).to_string());
    }
}
