//! Client configuration loaded from environment variables.
//!
//! All settings default to the production values, so the client runs with
//! zero configuration.

use parley_shared::constants::{
    JPEG_QUALITY, MAX_ATTACHMENT_FETCH_BYTES, MAX_IMAGE_SIDE, THREAD_COLLECTION,
    TOPICS_COLLECTION, UPLOADING_PLACEHOLDER,
};
use parley_shared::DocumentId;

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Collection holding the topic documents.
    /// Env: `PARLEY_TOPICS_COLLECTION`
    pub topics_collection: String,

    /// Maximum attachment payload fetched for display, in bytes.
    /// Env: `PARLEY_MAX_ATTACHMENT_FETCH_BYTES`
    pub max_attachment_fetch_bytes: usize,

    /// Upload bound for either image dimension.
    /// Env: `PARLEY_MAX_IMAGE_SIDE`
    pub max_image_side: u32,

    /// JPEG re-encode quality for uploaded images (0-100).
    /// Env: `PARLEY_JPEG_QUALITY`
    pub jpeg_quality: u8,

    /// Text the input surface shows while an upload is in flight.
    pub uploading_placeholder: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            topics_collection: TOPICS_COLLECTION.to_string(),
            max_attachment_fetch_bytes: MAX_ATTACHMENT_FETCH_BYTES,
            max_image_side: MAX_IMAGE_SIDE,
            jpeg_quality: JPEG_QUALITY,
            uploading_placeholder: UPLOADING_PLACEHOLDER.to_string(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(name) = std::env::var("PARLEY_TOPICS_COLLECTION") {
            if !name.is_empty() {
                config.topics_collection = name;
            }
        }

        if let Ok(val) = std::env::var("PARLEY_MAX_ATTACHMENT_FETCH_BYTES") {
            if let Ok(n) = val.parse::<usize>() {
                config.max_attachment_fetch_bytes = n;
            } else {
                tracing::warn!(value = %val, "Invalid PARLEY_MAX_ATTACHMENT_FETCH_BYTES, using default");
            }
        }

        if let Ok(val) = std::env::var("PARLEY_MAX_IMAGE_SIDE") {
            if let Ok(n) = val.parse::<u32>() {
                config.max_image_side = n;
            } else {
                tracing::warn!(value = %val, "Invalid PARLEY_MAX_IMAGE_SIDE, using default");
            }
        }

        if let Ok(val) = std::env::var("PARLEY_JPEG_QUALITY") {
            if let Ok(n) = val.parse::<u8>() {
                config.jpeg_quality = n.min(100);
            } else {
                tracing::warn!(value = %val, "Invalid PARLEY_JPEG_QUALITY, using default");
            }
        }

        config
    }

    /// Collection path of one topic's message thread.
    pub fn thread_path(&self, topic_id: &DocumentId) -> String {
        format!(
            "{}/{}/{}",
            self.topics_collection, topic_id, THREAD_COLLECTION
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_uses_production_values() {
        let config = ClientConfig::default();
        assert_eq!(config.topics_collection, "topics");
        assert_eq!(config.max_attachment_fetch_bytes, 1024 * 1024);
        assert_eq!(config.max_image_side, 480);
        assert_eq!(config.jpeg_quality, 40);
    }

    #[test]
    fn thread_path_nests_under_the_topic() {
        let config = ClientConfig::default();
        assert_eq!(
            config.thread_path(&DocumentId::from("t1")),
            "topics/t1/thread"
        );
    }
}
