//! Page resolution errors.

/// Configuration error found while resolving pages.
///
/// Every variant names the offending reference.
#[derive(Debug, thiserror::Error)]
pub enum PageError {
    /// A tree root or `@page` target does not exist.
    #[error("Missing page: {reference}")]
    MissingPage {
        /// Reference that was looked up.
        reference: String,
    },
    /// An `@include` target does not exist.
    #[error("Missing reference: {reference} (included from {page})")]
    MissingInclude {
        /// Page containing the include.
        page: String,
        /// Reference that was looked up.
        reference: String,
    },
    /// A page is its own ancestor in the navigation tree.
    #[error("Page {reference} is nested inside itself")]
    CyclicPage {
        /// Reference that closes the cycle.
        reference: String,
    },
    /// A page includes itself, directly or transitively.
    #[error("Page {reference} includes itself")]
    CyclicInclude {
        /// Reference that closes the cycle.
        reference: String,
    },
}
