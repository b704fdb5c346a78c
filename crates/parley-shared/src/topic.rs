//! Topic entity and its document field contract.

use serde_json::{json, Value};

use crate::change::DocumentSnapshot;
use crate::error::RecordError;
use crate::types::DocumentId;

/// A named discussion thread.  The live list keeps snapshot order and is
/// never re-sorted by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topic {
    pub id: Option<DocumentId>,
    pub name: String,
}

impl Topic {
    /// A locally created topic, not yet persisted.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
        }
    }

    /// Decode a store document into a topic.
    pub fn from_document(doc: &DocumentSnapshot) -> Result<Self, RecordError> {
        let name = doc
            .str_field("name")
            .ok_or(RecordError::MissingField("name"))?;
        Ok(Self {
            id: Some(doc.id.clone()),
            name: name.to_string(),
        })
    }

    /// Encode this topic as the field map persisted to the store.  The id is
    /// echoed back when present.
    pub fn to_fields(&self) -> Value {
        let mut map = serde_json::Map::new();
        map.insert("name".into(), json!(self.name));
        if let Some(ref id) = self.id {
            map.insert("id".into(), json!(id.as_str()));
        }
        Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_named_topic() {
        let doc = DocumentSnapshot::new("t1", json!({ "name": "rustaceans" }));
        let topic = Topic::from_document(&doc).unwrap();
        assert_eq!(topic.id, Some(DocumentId("t1".into())));
        assert_eq!(topic.name, "rustaceans");
    }

    #[test]
    fn rejects_topic_without_name() {
        let doc = DocumentSnapshot::new("t2", json!({}));
        assert_eq!(
            Topic::from_document(&doc).unwrap_err(),
            RecordError::MissingField("name")
        );
    }

    #[test]
    fn persisted_topic_echoes_its_id() {
        let topic = Topic {
            id: Some(DocumentId("t3".into())),
            name: "general".into(),
        };
        let fields = topic.to_fields();
        assert_eq!(fields["id"], "t3");
        assert_eq!(fields["name"], "general");
    }
}
