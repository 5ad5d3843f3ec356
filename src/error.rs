//! Error types for logseq-clipper.
//!
//! Picker failures that the user can simply retry (a highlight that cannot be
//! wrapped, a capture with nothing selected) are represented here too, but the
//! session swallows them; only the persistence and host layers surface errors
//! to their callers.

/// Error type for picker, formatting and persistence operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An operation that needs an active picker session ran without one.
    #[error("No picker session is active")]
    NoSession,

    /// Capture requested with no included element or no selected text.
    #[error("Nothing selected to capture")]
    NoContent,

    /// A text range could not be wrapped in a highlight marker.
    #[error("Range cannot be wrapped: {0}")]
    RangeWrap(String),

    /// A text range points at a node or offset that does not exist.
    #[error("Invalid text range: {0}")]
    InvalidRange(String),

    /// The target folder is not usable as a Logseq graph.
    #[error("Graph folder error: {0}")]
    Vault(String),

    /// Malformed native-messaging frame or request.
    #[error("Native messaging protocol error: {0}")]
    Protocol(String),

    /// Filesystem or stream failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization failure.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result type alias for clipper operations.
pub type Result<T> = std::result::Result<T, Error>;
