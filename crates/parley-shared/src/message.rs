//! Message entity and its document field contract.
//!
//! A persisted message record carries `created`, `senderID`, `senderName`,
//! and exactly one of `content` (inline text) or `url` (attachment address).
//! File attachments additionally set `content` to the `"file"` marker so a
//! reader can tell them apart from images.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use crate::change::DocumentSnapshot;
use crate::constants::FILE_MARKER;
use crate::error::RecordError;
use crate::types::{BlobAddress, DocumentId, Sender};

/// What a message carries.  Exactly one variant per message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessagePayload {
    /// Plain text typed into the input bar.
    Text(String),
    /// An uploaded image, fetched back from the blob store for display.
    Image { address: BlobAddress },
    /// An uploaded file; the original filename is the address's last path
    /// segment.
    File { address: BlobAddress },
}

impl MessagePayload {
    /// Attachment address for image payloads.  File payloads are rendered
    /// from a static placeholder and are not fetched.
    pub fn image_address(&self) -> Option<&BlobAddress> {
        match self {
            MessagePayload::Image { address } => Some(address),
            _ => None,
        }
    }
}

/// A chat message inside one topic thread.
///
/// Identity is the store-assigned `id`; two messages with equal non-`None`
/// ids are the same message no matter what else differs.  A locally
/// originated message has no id until the store echoes it back.
#[derive(Debug, Clone)]
pub struct Message {
    pub id: Option<DocumentId>,
    pub sender: Sender,
    pub sent_at: DateTime<Utc>,
    pub payload: MessagePayload,
    /// Resolved attachment bytes for display.  Populated by the feed once an
    /// image address has been fetched; never part of the persisted record.
    pub attachment: Option<Bytes>,
}

impl Message {
    /// A locally originated message, not yet persisted.
    pub fn outgoing(sender: Sender, payload: MessagePayload) -> Self {
        Self {
            id: None,
            sender,
            sent_at: Utc::now(),
            payload,
            attachment: None,
        }
    }

    /// Decode a store document into a message.
    pub fn from_document(doc: &DocumentSnapshot) -> Result<Self, RecordError> {
        let created = doc
            .str_field("created")
            .ok_or(RecordError::MissingField("created"))?;
        let sent_at = DateTime::parse_from_rfc3339(created)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|_| RecordError::InvalidTimestamp(created.to_string()))?;

        let sender_id = doc
            .str_field("senderID")
            .ok_or(RecordError::MissingField("senderID"))?;
        let sender_name = doc
            .str_field("senderName")
            .ok_or(RecordError::MissingField("senderName"))?;

        let content = doc.str_field("content");
        let url = doc.str_field("url");

        let payload = match (content, url) {
            (Some(FILE_MARKER), Some(url)) => MessagePayload::File {
                address: BlobAddress(url.to_string()),
            },
            (Some(text), _) => MessagePayload::Text(text.to_string()),
            (None, Some(url)) => MessagePayload::Image {
                address: BlobAddress(url.to_string()),
            },
            (None, None) => return Err(RecordError::NoPayload),
        };

        Ok(Self {
            id: Some(doc.id.clone()),
            sender: Sender::new(
                crate::types::UserId(sender_id.to_string()),
                sender_name,
            ),
            sent_at,
            payload,
            attachment: None,
        })
    }

    /// Encode this message as the field map persisted to the store.
    pub fn to_fields(&self) -> Value {
        let mut map = serde_json::Map::new();
        map.insert("created".into(), json!(self.sent_at.to_rfc3339()));
        map.insert("senderID".into(), json!(self.sender.id.as_str()));
        map.insert("senderName".into(), json!(self.sender.display_name));

        match &self.payload {
            MessagePayload::Text(text) => {
                map.insert("content".into(), json!(text));
            }
            MessagePayload::Image { address } => {
                map.insert("url".into(), json!(address.as_str()));
            }
            MessagePayload::File { address } => {
                map.insert("url".into(), json!(address.as_str()));
                map.insert("content".into(), json!(FILE_MARKER));
            }
        }
        Value::Object(map)
    }

    /// Whether both messages refer to the same persisted record.
    pub fn same_identity(&self, other: &Self) -> bool {
        match (&self.id, &other.id) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}
