//! Non-fatal warning reporting.
//!
//! Collisions and degraded plugin lookups are reported through an injected
//! [`Diagnostics`] sink instead of being printed, so that the CLI can route
//! them to the log and tests can assert on them.

use std::fmt;
use std::sync::Mutex;

/// Category of a warning.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WarningKind {
    /// Two pages (or entries) share the same reference; the later one wins.
    DuplicateReference,
    /// Two plugins produced the same top-level output key; the later one wins.
    OutputKeyCollision,
    /// A plugin fell back to partial data (e.g., a registry lookup failed).
    PluginDegraded,
}

impl WarningKind {
    /// Stable identifier used as a log field.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::DuplicateReference => "duplicate-reference",
            Self::OutputKeyCollision => "output-key-collision",
            Self::PluginDegraded => "plugin-degraded",
        }
    }
}

/// A non-fatal diagnostic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Warning {
    /// Category.
    pub kind: WarningKind,
    /// Human-readable message naming the offending reference, key or file.
    pub message: String,
}

impl Warning {
    /// Create a warning.
    #[must_use]
    pub fn new(kind: WarningKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind.code(), self.message)
    }
}

/// Sink for warnings emitted during a compilation run.
pub trait Diagnostics: Send + Sync {
    /// Report a warning.
    fn warn(&self, warning: Warning);
}

/// Forwards warnings to `tracing` at WARN level.
#[derive(Debug, Default)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn warn(&self, warning: Warning) {
        tracing::warn!(code = warning.kind.code(), "{}", warning.message);
    }
}

/// Stores warnings in memory.
///
/// # Example
///
/// ```
/// use tagdoc_compiler::{CollectingDiagnostics, Diagnostics, Warning, WarningKind};
///
/// let sink = CollectingDiagnostics::new();
/// sink.warn(Warning::new(WarningKind::DuplicateReference, "guide"));
/// assert_eq!(sink.count(WarningKind::DuplicateReference), 1);
/// ```
#[derive(Debug, Default)]
pub struct CollectingDiagnostics {
    warnings: Mutex<Vec<Warning>>,
}

impl CollectingDiagnostics {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all warnings, in emission order.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn warnings(&self) -> Vec<Warning> {
        self.warnings.lock().unwrap().clone()
    }

    /// Number of warnings of the given kind.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn count(&self, kind: WarningKind) -> usize {
        self.warnings
            .lock()
            .unwrap()
            .iter()
            .filter(|w| w.kind == kind)
            .count()
    }
}

impl Diagnostics for CollectingDiagnostics {
    fn warn(&self, warning: Warning) {
        self.warnings.lock().unwrap().push(warning);
    }
}
