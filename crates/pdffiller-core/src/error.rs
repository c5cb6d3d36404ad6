//! Fatal error type for pdffiller-rs.
//!
//! [`FormError`] covers conditions that stop processing of a document:
//! structural corruption of the field tree, unreadable input, and failures
//! at the serialization boundary. Per-field problems are not errors; they
//! are accumulated as [`FieldIssue`](crate::FieldIssue) values in an
//! [`ApplyReport`](crate::ApplyReport).

use std::fmt;

/// Fatal error types for form processing.
///
/// Any of these aborts the current operation before the object graph is
/// mutated (build-time errors) or propagates unchanged from the external
/// container boundary (parse, I/O, serialization).
#[derive(Debug, Clone, PartialEq)]
pub enum FormError {
    /// The field tree is structurally corrupt: a cycle, excessive depth, or a
    /// terminal field whose type cannot be resolved through inheritance.
    MalformedFieldTree(String),
    /// Two fields resolve to the same fully-qualified name.
    DuplicateFieldName(String),
    /// Error parsing PDF structure or syntax.
    ParseError(String),
    /// I/O error reading or writing PDF data.
    IoError(String),
    /// The mutated document could not be serialized.
    SerializationFailure(String),
    /// The PDF is encrypted and requires a password to open.
    PasswordRequired,
    /// The supplied password is incorrect for this encrypted PDF.
    InvalidPassword,
    /// The input exceeds [`FormOptions::max_input_bytes`](crate::FormOptions::max_input_bytes).
    InputTooLarge { limit: usize, actual: usize },
    /// Any other error not covered by specific variants.
    Other(String),
}

impl fmt::Display for FormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormError::MalformedFieldTree(msg) => write!(f, "malformed field tree: {msg}"),
            FormError::DuplicateFieldName(name) => write!(f, "duplicate field name: {name}"),
            FormError::ParseError(msg) => write!(f, "parse error: {msg}"),
            FormError::IoError(msg) => write!(f, "I/O error: {msg}"),
            FormError::SerializationFailure(msg) => write!(f, "serialization failure: {msg}"),
            FormError::PasswordRequired => write!(f, "PDF is encrypted and requires a password"),
            FormError::InvalidPassword => write!(f, "the supplied password is incorrect"),
            FormError::InputTooLarge { limit, actual } => {
                write!(f, "input is {actual} bytes, over the limit of {limit}")
            }
            FormError::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for FormError {}

impl From<std::io::Error> for FormError {
    fn from(err: std::io::Error) -> Self {
        FormError::IoError(err.to_string())
    }
}

impl FormError {
    /// Returns `true` for errors raised while building the field tree.
    ///
    /// These are the structural errors that halt an operation before any
    /// mutation takes place.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            FormError::MalformedFieldTree(_) | FormError::DuplicateFieldName(_)
        )
    }
}
