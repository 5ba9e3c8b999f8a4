//! Error kinds shared by the index core, the snapshot codec, and both services.

use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Transport-independent error kinds for the search system.
///
/// Each binary maps these to an HTTP status in its own `ApiError` wrapper
/// rather than here, so this crate stays free of any web-framework
/// dependency.
#[derive(Error, Debug)]
pub enum Error {
    /// The catalog returned nothing (or an inactive product) for a given id,
    /// or the product is absent from the index when an operation requires it.
    #[error("not found: {0}")]
    NotFound(String),

    /// The catalog database is unreachable, or a snapshot file is missing.
    #[error("unavailable: {0}")]
    Unavailable(String),

    /// The snapshot pair is torn, or the cross-map cardinality invariant was
    /// violated at load time.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Embedding, vector-index backend, or serialization failure.
    #[error("internal error: {0}")]
    Internal(String),

    /// Malformed query parameter (missing `query`, non-numeric `threshold`).
    #[error("bad request: {0}")]
    BadRequest(String),
}

impl From<bincode::Error> for Error {
    fn from(e: bincode::Error) -> Self {
        Error::Internal(format!("serialization failure: {e}"))
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::Unavailable(format!("snapshot file missing: {e}"))
        } else {
            Error::Internal(format!("io error: {e}"))
        }
    }
}
