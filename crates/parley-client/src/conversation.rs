//! One open topic thread.
//!
//! A conversation subscribes to its topic's message thread, folds change
//! batches into a [`MessageFeed`] (resolving image attachments through the
//! blob store), and carries the user's outgoing traffic: optimistic text
//! sends and coordinated attachment uploads.  Dropping the conversation
//! aborts the feed task, so a closed thread stops consuming events.

use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use parley_feed::MessageFeed;
use parley_shared::{DocumentId, Message, MessagePayload, Topic};

use crate::backend::{BlobResolver, BlobStore, RealtimeStore};
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::session::UserSession;
use crate::upload::{AttachmentPayload, AttachmentUploadCoordinator, UploadGate};

pub struct Conversation<S, B> {
    session: UserSession,
    topic: Topic,
    thread_path: String,
    store: Arc<S>,
    feed: Arc<Mutex<MessageFeed<BlobResolver<B>>>>,
    uploader: AttachmentUploadCoordinator<S, B>,
    feed_task: JoinHandle<()>,
}

impl<S: RealtimeStore, B: BlobStore> Conversation<S, B> {
    /// Open the conversation for `topic`, which must already be persisted.
    pub async fn open(
        session: UserSession,
        topic: Topic,
        store: Arc<S>,
        blobs: Arc<B>,
        config: &ClientConfig,
    ) -> Result<Self> {
        let topic_id: DocumentId = topic
            .id
            .clone()
            .ok_or(ClientError::TopicNotPersisted)?;
        let thread_path = config.thread_path(&topic_id);

        let feed = Arc::new(Mutex::new(MessageFeed::new(
            BlobResolver::new(blobs.clone()),
            config.max_attachment_fetch_bytes,
        )));

        let mut rx = store.subscribe(&thread_path).await?;
        let feed_task = tokio::spawn({
            let feed = feed.clone();
            let thread_path = thread_path.clone();
            async move {
                while let Some(batch) = rx.recv().await {
                    feed.lock().await.apply(&batch).await;
                }
                debug!(thread = %thread_path, "Thread subscription closed");
            }
        });

        let uploader = AttachmentUploadCoordinator::new(
            store.clone(),
            blobs,
            topic_id.as_str(),
            thread_path.clone(),
            config,
        );

        Ok(Self {
            session,
            topic,
            thread_path,
            store,
            feed,
            uploader,
            feed_task,
        })
    }

    pub fn topic(&self) -> &Topic {
        &self.topic
    }

    /// Current thread snapshot in send order.
    pub async fn messages(&self) -> Vec<Message> {
        self.feed.lock().await.messages().to_vec()
    }

    /// The flag the input surface observes while an upload is in flight.
    pub fn upload_gate(&self) -> UploadGate {
        self.uploader.gate()
    }

    /// Send a text message.  The message shows up in the snapshot
    /// immediately as a pending entry and is confirmed by the store's echo;
    /// a failed persist rolls the pending entry back.
    pub async fn send_text(&self, content: &str) -> Result<()> {
        let pending = Message::outgoing(
            self.session.sender(),
            MessagePayload::Text(content.to_string()),
        );
        self.feed.lock().await.register_pending(pending.clone());

        match self
            .store
            .add_document(&self.thread_path, pending.to_fields())
            .await
        {
            Ok(id) => {
                debug!(thread = %self.thread_path, doc = %id, "Message sent");
                Ok(())
            }
            Err(e) => {
                self.feed.lock().await.retract_pending(&pending);
                warn!(thread = %self.thread_path, error = %e, "Message send failed");
                Err(e.into())
            }
        }
    }

    /// Upload an image and send the resulting attachment message.  Failures
    /// are logged and swallowed by the coordinator.
    pub async fn send_image(&self, bytes: Bytes) {
        self.uploader
            .begin_upload(&self.session.sender(), AttachmentPayload::Image { bytes })
            .await;
    }

    /// Upload a file byte-for-byte and send the resulting attachment
    /// message.
    pub async fn send_file(&self, bytes: Bytes, file_name: &str) {
        self.uploader
            .begin_upload(
                &self.session.sender(),
                AttachmentPayload::File {
                    bytes,
                    file_name: file_name.to_string(),
                },
            )
            .await;
    }

    /// Stop consuming the thread's change feed.
    pub fn close(self) {}
}

impl<S, B> Drop for Conversation<S, B> {
    fn drop(&mut self) {
        self.feed_task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use parley_shared::{ChangeKind, DocumentChange, DocumentSnapshot};
    use serde_json::json;

    use crate::memory::MemoryBackend;

    async fn wait_for<F: std::future::Future<Output = bool>, G: Fn() -> F>(ready: G) {
        for _ in 0..100 {
            if ready().await {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("condition not reached in time");
    }

    async fn open_conversation(
        backend: &Arc<MemoryBackend>,
    ) -> Conversation<MemoryBackend, MemoryBackend> {
        let session = UserSession::sign_in(backend.as_ref(), backend.as_ref(), "Ada")
            .await
            .unwrap();
        let topic_id = backend
            .add_document("topics", json!({ "name": "general" }))
            .await
            .unwrap();
        let topic = Topic {
            id: Some(topic_id),
            name: "general".into(),
        };
        Conversation::open(
            session,
            topic,
            backend.clone(),
            backend.clone(),
            &ClientConfig::default(),
        )
        .await
        .unwrap()
    }

    fn png_bytes() -> Bytes {
        use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
        let img = ImageBuffer::from_pixel(16, 16, Rgb([5u8, 150, 50]));
        let mut out = std::io::Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        Bytes::from(out.into_inner())
    }

    #[tokio::test]
    async fn unpersisted_topic_cannot_be_opened() {
        let backend = Arc::new(MemoryBackend::new());
        let session = UserSession::sign_in(backend.as_ref(), backend.as_ref(), "Ada")
            .await
            .unwrap();
        let err = Conversation::open(
            session,
            Topic::new("draft"),
            backend.clone(),
            backend,
            &ClientConfig::default(),
        )
        .await
        .err()
        .expect("draft topic must be rejected");
        assert!(matches!(err, ClientError::TopicNotPersisted));
    }

    #[tokio::test]
    async fn text_send_is_visible_immediately_and_confirmed_by_the_echo() {
        let backend = Arc::new(MemoryBackend::new());
        let convo = open_conversation(&backend).await;

        convo.send_text("hello there").await.unwrap();

        // Optimistic entry is in the snapshot before any echo arrives.
        let snapshot = convo.messages().await;
        assert_eq!(snapshot.len(), 1);

        // The persisted echo confirms it without duplicating it.
        wait_for(|| async {
            let msgs = convo.messages().await;
            msgs.len() == 1 && msgs[0].id.is_some()
        })
        .await;
    }

    #[tokio::test]
    async fn failed_text_send_rolls_the_pending_entry_back() {
        let backend = Arc::new(MemoryBackend::new());
        let convo = open_conversation(&backend).await;
        backend.fail_document_adds(true);

        assert!(convo.send_text("lost").await.is_err());
        assert!(convo.messages().await.is_empty());
    }

    #[tokio::test]
    async fn incoming_messages_are_ordered_by_send_time() {
        let backend = Arc::new(MemoryBackend::new());
        let convo = open_conversation(&backend).await;
        let thread = convo.thread_path.clone();

        let doc = |id: &str, t: &str, text: &str| {
            DocumentSnapshot::new(
                id,
                json!({
                    "created": t,
                    "senderID": "u9",
                    "senderName": "Grace",
                    "content": text,
                }),
            )
        };
        backend
            .emit(
                &thread,
                vec![
                    DocumentChange::added(doc("m1", "2024-05-01T10:00:00Z", "first")),
                    DocumentChange::added(doc("m3", "2024-05-01T10:00:20Z", "third")),
                    DocumentChange::added(doc("m2", "2024-05-01T10:00:10Z", "second")),
                ],
            )
            .await;

        wait_for(|| async { convo.messages().await.len() == 3 }).await;
        let texts: Vec<_> = convo
            .messages()
            .await
            .iter()
            .map(|m| match &m.payload {
                MessagePayload::Text(t) => t.clone(),
                other => panic!("unexpected payload {other:?}"),
            })
            .collect();
        assert_eq!(texts, ["first", "second", "third"]);
    }

    #[tokio::test]
    async fn sent_image_comes_back_resolved() {
        let backend = Arc::new(MemoryBackend::new());
        let convo = open_conversation(&backend).await;

        convo.send_image(png_bytes()).await;

        wait_for(|| async { convo.messages().await.len() == 1 }).await;
        let msgs = convo.messages().await;
        assert!(matches!(msgs[0].payload, MessagePayload::Image { .. }));
        // The echo resolved the uploaded blob for display.
        assert!(msgs[0].attachment.is_some());
        assert_eq!(backend.blob_count(), 1);
    }

    #[tokio::test]
    async fn sent_file_keeps_its_name_and_bytes() {
        let backend = Arc::new(MemoryBackend::new());
        let convo = open_conversation(&backend).await;

        convo
            .send_file(Bytes::from_static(b"raw file bytes"), "notes.txt")
            .await;

        wait_for(|| async { convo.messages().await.len() == 1 }).await;
        let msgs = convo.messages().await;
        match &msgs[0].payload {
            MessagePayload::File { address } => {
                assert_eq!(address.file_name(), "notes.txt");
                let stored = backend
                    .get(address, 1024 * 1024)
                    .await
                    .expect("file blob is stored");
                assert_eq!(stored, Bytes::from_static(b"raw file bytes"));
            }
            other => panic!("expected file payload, got {other:?}"),
        }
        // Files are rendered from a placeholder, never fetched by the feed.
        assert!(msgs[0].attachment.is_none());
    }

    #[tokio::test]
    async fn removed_messages_leave_the_snapshot() {
        let backend = Arc::new(MemoryBackend::new());
        let convo = open_conversation(&backend).await;
        let thread = convo.thread_path.clone();

        convo.send_text("short lived").await.unwrap();
        wait_for(|| async {
            convo.messages().await.first().map(|m| m.id.is_some()) == Some(true)
        })
        .await;

        let id = convo.messages().await[0].id.clone().unwrap();
        backend
            .emit(
                &thread,
                vec![DocumentChange::new(
                    ChangeKind::Removed,
                    DocumentSnapshot::new(
                        id.as_str(),
                        json!({
                            "created": "2024-05-01T10:00:00Z",
                            "senderID": "u1",
                            "senderName": "Ada",
                            "content": "short lived",
                        }),
                    ),
                )],
            )
            .await;

        wait_for(|| async { convo.messages().await.is_empty() }).await;
    }
}
