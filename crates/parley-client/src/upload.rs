//! Attachment upload coordination.
//!
//! One transfer per conversation is in flight at a time; the shared
//! [`UploadGate`] is what the input surface watches to disable editing and
//! show the uploading placeholder.  A finished transfer emits a message
//! record referencing the blob's address; a failed transfer is logged and
//! discarded with no retry.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Context;
use bytes::Bytes;
use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use parley_media::prepare_image_for_upload;
use parley_shared::constants::{FILE_CONTENT_TYPE, IMAGE_CONTENT_TYPE};
use parley_shared::{Message, MessagePayload, Sender};

use crate::backend::{BlobStore, RealtimeStore};
use crate::config::ClientConfig;

/// What the user picked for upload.
#[derive(Debug, Clone)]
pub enum AttachmentPayload {
    /// An image; downscaled and re-encoded before upload.
    Image { bytes: Bytes },
    /// An arbitrary file; uploaded byte-for-byte under its original name.
    File { bytes: Bytes, file_name: String },
}

/// Shared "upload in flight" flag.
///
/// Written only by the coordinator, read by the input-surface rendering
/// path.  Clone freely; clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct UploadGate(Arc<AtomicBool>);

impl UploadGate {
    pub fn is_uploading(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    fn set(&self, uploading: bool) {
        self.0.store(uploading, Ordering::Release);
    }
}

/// Serializes attachment transfers for one conversation.
pub struct AttachmentUploadCoordinator<S, B> {
    store: Arc<S>,
    blobs: Arc<B>,
    /// Blob paths are namespaced under the topic id.
    topic_id: String,
    thread_path: String,
    gate: UploadGate,
    /// Single transfer slot; a second upload waits here.
    slot: Mutex<()>,
    max_image_side: u32,
    jpeg_quality: u8,
}

impl<S: RealtimeStore, B: BlobStore> AttachmentUploadCoordinator<S, B> {
    pub fn new(
        store: Arc<S>,
        blobs: Arc<B>,
        topic_id: impl Into<String>,
        thread_path: impl Into<String>,
        config: &ClientConfig,
    ) -> Self {
        Self {
            store,
            blobs,
            topic_id: topic_id.into(),
            thread_path: thread_path.into(),
            gate: UploadGate::default(),
            slot: Mutex::new(()),
            max_image_side: config.max_image_side,
            jpeg_quality: config.jpeg_quality,
        }
    }

    /// The flag the input surface observes.
    pub fn gate(&self) -> UploadGate {
        self.gate.clone()
    }

    /// Upload `payload` and persist the resulting message.
    ///
    /// Failures are logged and swallowed: the pending message is discarded,
    /// no retry happens, and the coordinator returns to idle.
    pub async fn begin_upload(&self, sender: &Sender, payload: AttachmentPayload) {
        let _slot = self.slot.lock().await;
        self.gate.set(true);

        if let Err(e) = self.transfer(sender, payload).await {
            warn!(topic = %self.topic_id, error = %e, "Attachment upload failed");
        }

        self.gate.set(false);
    }

    async fn transfer(&self, sender: &Sender, payload: AttachmentPayload) -> anyhow::Result<()> {
        let (path, bytes, content_type) = match payload {
            AttachmentPayload::Image { bytes } => {
                let encoded =
                    prepare_image_for_upload(&bytes, self.max_image_side, self.jpeg_quality)
                        .context("preparing image")?;
                let name = format!("{}{}", Uuid::new_v4(), Utc::now().timestamp());
                (
                    format!("{}/{}", self.topic_id, name),
                    Bytes::from(encoded),
                    IMAGE_CONTENT_TYPE,
                )
            }
            AttachmentPayload::File { bytes, file_name } => (
                format!("{}/{}", self.topic_id, file_name),
                bytes,
                FILE_CONTENT_TYPE,
            ),
        };

        let is_file = content_type == FILE_CONTENT_TYPE;
        let address = self
            .blobs
            .put(&path, bytes, content_type)
            .await
            .context("storing blob")?;

        let payload = if is_file {
            MessagePayload::File {
                address: address.clone(),
            }
        } else {
            MessagePayload::Image {
                address: address.clone(),
            }
        };
        let message = Message::outgoing(sender.clone(), payload);

        let doc_id = self
            .store
            .add_document(&self.thread_path, message.to_fields())
            .await
            .context("persisting message")?;

        info!(topic = %self.topic_id, doc = %doc_id, address = %address, "Attachment sent");
        Ok(())
    }
}
