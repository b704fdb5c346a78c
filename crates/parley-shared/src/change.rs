use serde_json::Value;

use crate::types::DocumentId;

/// Kind of a realtime change notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Modified,
    Removed,
}

/// A single document as delivered by the realtime store: the store-assigned
/// id plus the current field values as a JSON object.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSnapshot {
    pub id: DocumentId,
    pub fields: Value,
}

impl DocumentSnapshot {
    pub fn new(id: impl Into<String>, fields: Value) -> Self {
        Self {
            id: DocumentId(id.into()),
            fields,
        }
    }

    /// String field accessor; `None` when absent or not a string.
    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }
}

/// One entry of a change batch.  Each change carries its own document, so a
/// batch maps every affected row to its kind by identity.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentChange {
    pub kind: ChangeKind,
    pub doc: DocumentSnapshot,
}

impl DocumentChange {
    pub fn new(kind: ChangeKind, doc: DocumentSnapshot) -> Self {
        Self { kind, doc }
    }

    pub fn added(doc: DocumentSnapshot) -> Self {
        Self::new(ChangeKind::Added, doc)
    }

    pub fn modified(doc: DocumentSnapshot) -> Self {
        Self::new(ChangeKind::Modified, doc)
    }

    pub fn removed(doc: DocumentSnapshot) -> Self {
        Self::new(ChangeKind::Removed, doc)
    }
}
