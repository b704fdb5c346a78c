use thiserror::Error;

/// Errors surfaced by backend collaborators.
#[derive(Error, Debug)]
pub enum BackendError {
    /// The store or network is unreachable.  Transient; the caller abandons
    /// the operation without retrying.
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    /// No blob lives at the requested address.
    #[error("Blob not found: {0}")]
    BlobNotFound(String),

    /// The blob exceeds the caller's fetch limit.
    #[error("Blob too large: {size} bytes (max {max})")]
    BlobTooLarge { size: usize, max: usize },
}

/// Errors returned by client service entry points.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// Sign-in requires a non-empty display name.
    #[error("Display name must not be empty")]
    EmptyDisplayName,

    /// Topic creation requires a non-empty name.
    #[error("Topic name must not be empty")]
    EmptyTopicName,

    /// A conversation can only be opened for a topic the store has
    /// confirmed.
    #[error("Topic has not been persisted yet")]
    TopicNotPersisted,
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ClientError>;
