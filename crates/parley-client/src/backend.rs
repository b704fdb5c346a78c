//! Backend collaborator traits.
//!
//! The realtime document store, blob store, identity provider, and local
//! preference store are external services.  The client crate only speaks to
//! them through these traits; [`crate::memory::MemoryBackend`] implements all
//! four in-process for tests.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;
use tokio::sync::mpsc;

use parley_feed::{AttachmentResolver, ResolveError};
use parley_shared::{BlobAddress, DocumentChange, DocumentId, UserId};

use crate::error::BackendError;

/// Realtime cloud document store.
///
/// A subscription delivers change batches for one collection; batches arrive
/// in order and each batch is applied before the next is delivered.
#[async_trait]
pub trait RealtimeStore: Send + Sync + 'static {
    /// Open a change feed over `collection_path`.  The first delivered batch
    /// covers the current contents of the collection.
    async fn subscribe(
        &self,
        collection_path: &str,
    ) -> Result<mpsc::Receiver<Vec<DocumentChange>>, BackendError>;

    /// Persist a new document; the store assigns and returns its id.
    async fn add_document(
        &self,
        collection_path: &str,
        fields: Value,
    ) -> Result<DocumentId, BackendError>;
}

/// Blob storage for attachment payloads.
#[async_trait]
pub trait BlobStore: Send + Sync + 'static {
    /// Store `bytes` under `path` and return the address to fetch them back.
    async fn put(
        &self,
        path: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<BlobAddress, BackendError>;

    /// Fetch a blob, refusing payloads above `max_bytes`.
    async fn get(&self, address: &BlobAddress, max_bytes: usize) -> Result<Bytes, BackendError>;
}

/// Anonymous authentication provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync + 'static {
    async fn sign_in_anonymously(&self) -> Result<UserId, BackendError>;
    async fn sign_out(&self) -> Result<(), BackendError>;
}

/// Local persistent preferences.  Holds the single display-name string.
pub trait PreferenceStore: Send + Sync + 'static {
    fn display_name(&self) -> Option<String>;
    fn set_display_name(&self, name: &str);
    fn clear_display_name(&self);
}

/// Adapts a [`BlobStore`] to the feed's attachment resolver seam.
pub struct BlobResolver<B> {
    store: Arc<B>,
}

impl<B> BlobResolver<B> {
    pub fn new(store: Arc<B>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<B: BlobStore> AttachmentResolver for BlobResolver<B> {
    async fn resolve(
        &self,
        address: &BlobAddress,
        max_bytes: usize,
    ) -> Result<Bytes, ResolveError> {
        self.store
            .get(address, max_bytes)
            .await
            .map_err(|e| match e {
                BackendError::BlobTooLarge { size, max } => ResolveError::TooLarge { size, max },
                other => ResolveError::Unavailable(other.to_string()),
            })
    }
}
