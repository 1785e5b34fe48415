// Error types for the resolution path

use thiserror::Error;

/// Errors surfaced by `Resolver::resolve`.
///
/// Nothing here is fatal: every variant leaves the caller free to retry
/// or switch mode. The `Display` strings are the user-facing status
/// messages; raw network and parse errors never cross this boundary.
#[derive(Debug, Clone, Error)]
pub enum ResolveError {
    /// Input text contained no http(s) URL
    #[error("No link found. Paste a URL and try again.")]
    NoUrlFound,

    /// The selected backend(s) were exhausted without a usable result
    #[error("Could not resolve media from any server.")]
    ResolutionFailed,

    /// A backend responded but nothing downloadable could be extracted.
    /// Normal outcome for unsupported content, not a system error.
    #[error("No downloadable media found for this link.")]
    EmptyResult,

    /// A single upstream call failed (non-2xx, network error, malformed
    /// body, or an explicit error field). Converted to
    /// `ResolutionFailed` once fallback is exhausted.
    #[error("{backend} resolver failed: {reason}")]
    BackendFailed {
        backend: &'static str,
        reason: String,
    },
}

impl ResolveError {
    /// Collapse per-backend detail into the terminal variant shown to
    /// the caller once no further fallback exists.
    pub(crate) fn into_terminal(self) -> Self {
        match self {
            Self::BackendFailed { .. } => Self::ResolutionFailed,
            other => other,
        }
    }
}
