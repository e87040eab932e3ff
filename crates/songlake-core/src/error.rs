//! Error types for songlake.
//!
//! A single error type with one variant per failure class a caller can act
//! on: bad input, missing record, store unreachable, store fault and
//! cancellation.

use thiserror::Error;

/// The unified error type for catalog operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The request was malformed. Detected before any store round trip.
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] InvalidArgumentError),

    /// A mutation targeted an identifier that is not in the store.
    #[error("song {id} not found")]
    NotFound { id: String },

    /// The store could not be reached.
    #[error("store unavailable during {operation}: {message}")]
    Unavailable {
        operation: &'static str,
        message: String,
    },

    /// The store failed while serving the request.
    #[error("internal error during {operation}: {message}")]
    Internal {
        operation: &'static str,
        message: String,
    },

    /// The call was abandoned before the store answered.
    #[error("{operation} cancelled")]
    Cancelled { operation: &'static str },
}

impl Error {
    /// Stable name of the error class, suitable for exit codes and logs.
    pub fn code(&self) -> &'static str {
        match self {
            Error::InvalidArgument(_) => "InvalidArgument",
            Error::NotFound { .. } => "NotFound",
            Error::Unavailable { .. } => "Unavailable",
            Error::Internal { .. } => "Internal",
            Error::Cancelled { .. } => "Cancelled",
        }
    }

    /// Check if this error was raised by request validation.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Error::InvalidArgument(_))
    }

    /// Check if this error means the targeted song does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    /// Build an [`Error::Unavailable`] for the named store operation.
    pub fn unavailable(operation: &'static str, err: impl std::fmt::Display) -> Self {
        Error::Unavailable {
            operation,
            message: err.to_string(),
        }
    }

    /// Build an [`Error::Internal`] for the named store operation.
    pub fn internal(operation: &'static str, err: impl std::fmt::Display) -> Self {
        Error::Internal {
            operation,
            message: err.to_string(),
        }
    }
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidArgumentError {
    /// Song identifier is not a 24 character hex string.
    #[error("invalid song id '{value}': {reason}")]
    SongId { value: String, reason: String },

    /// Page token below zero.
    #[error("page token must be non-negative, got {value}")]
    PageToken { value: i64 },

    /// Page size below zero.
    #[error("page size must be non-negative, got {value}")]
    PageSize { value: i64 },

    /// A song in an ingest batch has no uri.
    #[error("song at index {index} has no uri")]
    MissingUri { index: usize },

    /// A tag name was empty.
    #[error("tag names cannot be empty")]
    EmptyTagName,

    /// A tag value equal to the existence wildcard was offered for storage.
    #[error("tag '{name}' cannot be stored with the reserved value '*'")]
    ReservedTagValue { name: String },

    /// A lookup named both identifiers and tags.
    #[error("a lookup selects by ids or by tags, not both")]
    ConflictingSelectors,

    /// Generic invalid input.
    #[error("{message}")]
    Other { message: String },
}
