//! Folds delivered change batches into projections.
//!
//! Events within one batch apply in the order given; each event carries its
//! own document and kind, so rows pair with their change by identity rather
//! than by position in the batch.

use tracing::{debug, warn};

use parley_shared::{ChangeKind, DocumentChange, Message, Topic};

use crate::projection::Projection;
use crate::resolver::AttachmentResolver;

/// Live topic list reconciler.
#[derive(Debug, Default)]
pub struct TopicFeed {
    projection: Projection<Topic>,
}

impl TopicFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current topic list in display order.
    pub fn topics(&self) -> &[Topic] {
        self.projection.snapshot()
    }

    /// Apply one delivered batch, in order.  Malformed documents are skipped;
    /// a removal only needs the id and never decodes the document.
    pub fn apply(&mut self, batch: &[DocumentChange]) {
        for change in batch {
            if change.kind == ChangeKind::Removed {
                self.projection.remove(&change.doc.id);
                continue;
            }
            let topic = match Topic::from_document(&change.doc) {
                Ok(topic) => topic,
                Err(e) => {
                    debug!(doc = %change.doc.id, error = %e, "Skipping malformed topic document");
                    continue;
                }
            };
            if change.kind == ChangeKind::Added {
                self.projection.insert(topic);
            } else {
                self.projection.replace(topic);
            }
        }
    }
}

/// Message thread reconciler for one topic.
///
/// Image attachments are resolved before their message becomes visible; a
/// failed or oversized resolution drops the event silently.
pub struct MessageFeed<R> {
    projection: Projection<Message>,
    resolver: R,
    max_fetch_bytes: usize,
}

impl<R: AttachmentResolver> MessageFeed<R> {
    pub fn new(resolver: R, max_fetch_bytes: usize) -> Self {
        Self {
            projection: Projection::new(),
            resolver,
            max_fetch_bytes,
        }
    }

    /// Current thread in send order.
    pub fn messages(&self) -> &[Message] {
        self.projection.snapshot()
    }

    /// Register an optimistic outgoing message until the store echoes it.
    pub fn register_pending(&mut self, message: Message) {
        self.projection.insert_pending(message);
    }

    /// Roll back an optimistic message whose persistence failed.
    pub fn retract_pending(&mut self, like: &Message) -> bool {
        self.projection.remove_matching_pending(like)
    }

    /// Apply one delivered batch, in order.
    pub async fn apply(&mut self, batch: &[DocumentChange]) {
        for change in batch {
            if change.kind == ChangeKind::Removed {
                self.projection.remove(&change.doc.id);
                continue;
            }
            let mut message = match Message::from_document(&change.doc) {
                Ok(message) => message,
                Err(e) => {
                    debug!(doc = %change.doc.id, error = %e, "Skipping malformed message document");
                    continue;
                }
            };
            if change.kind == ChangeKind::Modified {
                self.projection.replace(message);
                continue;
            }
            // Duplicate delivery: skip before fetching anything.
            if self.projection.contains_id(&change.doc.id) {
                continue;
            }
            if let Some(address) = message.payload.image_address() {
                match self.resolver.resolve(address, self.max_fetch_bytes).await {
                    Ok(bytes) => message.attachment = Some(bytes),
                    Err(e) => {
                        warn!(
                            doc = %change.doc.id,
                            address = %address,
                            error = %e,
                            "Dropping message with unresolvable attachment"
                        );
                        continue;
                    }
                }
            }
            self.projection.insert(message);
        }
    }
}
