//! In-process backend implementing every collaborator trait.
//!
//! Backs the test suite and local experiments: documents live in hash maps,
//! subscriptions are tokio channels, and blob addresses are the storage
//! paths themselves.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;
use tokio::sync::mpsc;

use parley_shared::{BlobAddress, DocumentChange, DocumentId, DocumentSnapshot, UserId};

use crate::backend::{BlobStore, IdentityProvider, PreferenceStore, RealtimeStore};
use crate::error::BackendError;

const SUBSCRIPTION_BUFFER: usize = 64;

/// In-memory realtime store, blob store, identity provider, and preference
/// store in one.
#[derive(Default)]
pub struct MemoryBackend {
    collections: Mutex<HashMap<String, Vec<DocumentSnapshot>>>,
    subscribers: Mutex<HashMap<String, Vec<mpsc::Sender<Vec<DocumentChange>>>>>,
    blobs: Mutex<HashMap<String, Bytes>>,
    stored_name: Mutex<Option<String>>,
    next_doc: AtomicU64,
    next_user: AtomicU64,
    blob_puts_fail: AtomicBool,
    document_adds_fail: AtomicBool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent blob `put` fail, for failure-path tests.
    pub fn fail_blob_puts(&self, fail: bool) {
        self.blob_puts_fail.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent `add_document` fail, for failure-path tests.
    pub fn fail_document_adds(&self, fail: bool) {
        self.document_adds_fail.store(fail, Ordering::SeqCst);
    }

    /// Current documents of one collection, in insertion order.
    pub fn documents(&self, collection_path: &str) -> Vec<DocumentSnapshot> {
        self.collections
            .lock()
            .expect("collections lock")
            .get(collection_path)
            .cloned()
            .unwrap_or_default()
    }

    pub fn blob_count(&self) -> usize {
        self.blobs.lock().expect("blobs lock").len()
    }

    /// Deliver a hand-built change batch to every subscriber of
    /// `collection_path`, bypassing document storage.  Lets tests inject
    /// modified/removed events.
    pub async fn emit(&self, collection_path: &str, batch: Vec<DocumentChange>) {
        self.broadcast(collection_path, batch).await;
    }

    async fn broadcast(&self, collection_path: &str, batch: Vec<DocumentChange>) {
        let targets: Vec<mpsc::Sender<Vec<DocumentChange>>> = self
            .subscribers
            .lock()
            .expect("subscribers lock")
            .get(collection_path)
            .cloned()
            .unwrap_or_default();

        for tx in targets {
            // A dropped receiver just means that subscription is gone.
            let _ = tx.send(batch.clone()).await;
        }
    }
}

#[async_trait]
impl RealtimeStore for MemoryBackend {
    async fn subscribe(
        &self,
        collection_path: &str,
    ) -> Result<mpsc::Receiver<Vec<DocumentChange>>, BackendError> {
        let (tx, rx) = mpsc::channel(SUBSCRIPTION_BUFFER);

        // Replay current contents as the opening batch.
        let existing: Vec<DocumentChange> = self
            .documents(collection_path)
            .into_iter()
            .map(DocumentChange::added)
            .collect();
        if !existing.is_empty() {
            let _ = tx.send(existing).await;
        }

        self.subscribers
            .lock()
            .expect("subscribers lock")
            .entry(collection_path.to_string())
            .or_default()
            .push(tx);
        Ok(rx)
    }

    async fn add_document(
        &self,
        collection_path: &str,
        fields: Value,
    ) -> Result<DocumentId, BackendError> {
        if self.document_adds_fail.load(Ordering::SeqCst) {
            return Err(BackendError::Unavailable("document store offline".into()));
        }

        let id = format!("doc-{}", self.next_doc.fetch_add(1, Ordering::SeqCst) + 1);
        let doc = DocumentSnapshot::new(id.clone(), fields);

        self.collections
            .lock()
            .expect("collections lock")
            .entry(collection_path.to_string())
            .or_default()
            .push(doc.clone());

        self.broadcast(collection_path, vec![DocumentChange::added(doc)])
            .await;
        Ok(DocumentId(id))
    }
}

#[async_trait]
impl BlobStore for MemoryBackend {
    async fn put(
        &self,
        path: &str,
        bytes: Bytes,
        _content_type: &str,
    ) -> Result<BlobAddress, BackendError> {
        if self.blob_puts_fail.load(Ordering::SeqCst) {
            return Err(BackendError::Unavailable("blob store offline".into()));
        }

        self.blobs
            .lock()
            .expect("blobs lock")
            .insert(path.to_string(), bytes);
        Ok(BlobAddress(path.to_string()))
    }

    async fn get(&self, address: &BlobAddress, max_bytes: usize) -> Result<Bytes, BackendError> {
        let bytes = self
            .blobs
            .lock()
            .expect("blobs lock")
            .get(address.as_str())
            .cloned()
            .ok_or_else(|| BackendError::BlobNotFound(address.to_string()))?;

        if bytes.len() > max_bytes {
            return Err(BackendError::BlobTooLarge {
                size: bytes.len(),
                max: max_bytes,
            });
        }
        Ok(bytes)
    }
}

#[async_trait]
impl IdentityProvider for MemoryBackend {
    async fn sign_in_anonymously(&self) -> Result<UserId, BackendError> {
        let n = self.next_user.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(UserId(format!("anon-{n}")))
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        Ok(())
    }
}

impl PreferenceStore for MemoryBackend {
    fn display_name(&self) -> Option<String> {
        self.stored_name.lock().expect("name lock").clone()
    }

    fn set_display_name(&self, name: &str) {
        *self.stored_name.lock().expect("name lock") = Some(name.to_string());
    }

    fn clear_display_name(&self) {
        *self.stored_name.lock().expect("name lock") = None;
    }
}
