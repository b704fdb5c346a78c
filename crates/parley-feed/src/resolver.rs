use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

use parley_shared::BlobAddress;

/// Why an attachment could not be resolved to displayable bytes.
#[derive(Error, Debug)]
pub enum ResolveError {
    /// The payload exceeds the fetch limit.
    #[error("Attachment too large: {size} bytes (max {max})")]
    TooLarge { size: usize, max: usize },

    /// The blob store could not serve the address.
    #[error("Attachment unavailable: {0}")]
    Unavailable(String),
}

/// Fetches attachment bytes for display, bounded by `max_bytes`.
///
/// The feed drops the enclosing change event when resolution fails; the
/// resolver never retries.
#[async_trait]
pub trait AttachmentResolver: Send + Sync {
    async fn resolve(&self, address: &BlobAddress, max_bytes: usize)
        -> Result<Bytes, ResolveError>;
}
