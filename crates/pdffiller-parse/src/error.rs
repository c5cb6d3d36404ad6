//! Error types for the lopdf backend.
//!
//! Uses [`thiserror`] for ergonomic error derivation. Provides [`BackendError`]
//! that wraps lopdf failures and converts them to [`FormError`].

use pdffiller_core::FormError;
use thiserror::Error;

/// Error type for object graph operations.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Error from PDF parsing (structure, syntax, object resolution).
    #[error("PDF parse error: {0}")]
    Parse(String),

    /// Error reading or writing PDF data.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The mutated document could not be written out.
    #[error("failed to serialize PDF: {0}")]
    Serialize(String),

    /// A core library error.
    #[error(transparent)]
    Core(#[from] FormError),
}

impl From<BackendError> for FormError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Parse(msg) => FormError::ParseError(msg),
            BackendError::Io(e) => FormError::IoError(e.to_string()),
            BackendError::Serialize(msg) => FormError::SerializationFailure(msg),
            BackendError::Core(e) => e,
        }
    }
}
