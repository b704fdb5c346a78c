use thiserror::Error;

/// Errors converting a store document into a domain entity.
///
/// A document failing any of these checks is malformed; the enclosing change
/// event is ignored and the projection stays untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// A required field is absent or has the wrong type.
    #[error("Missing or invalid field: {0}")]
    MissingField(&'static str),

    /// The `created` timestamp is not RFC 3339.
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// Neither `content` nor `url` is present, or the file marker is set
    /// without an address.
    #[error("Document carries no recognisable payload")]
    NoPayload,
}
