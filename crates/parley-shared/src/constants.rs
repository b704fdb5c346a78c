/// Collection holding the topic documents.
pub const TOPICS_COLLECTION: &str = "topics";

/// Sub-collection of a topic document holding its message thread.
pub const THREAD_COLLECTION: &str = "thread";

/// Maximum attachment payload fetched back from the blob store (1 MiB).
pub const MAX_ATTACHMENT_FETCH_BYTES: usize = 1024 * 1024;

/// Neither side of an uploaded image may exceed this length.
pub const MAX_IMAGE_SIDE: u32 = 480;

/// JPEG re-encode quality for uploaded images (0-100).
pub const JPEG_QUALITY: u8 = 40;

/// Content type recorded for uploaded images.
pub const IMAGE_CONTENT_TYPE: &str = "image/jpeg";

/// Content type recorded for uploaded files.
pub const FILE_CONTENT_TYPE: &str = "application/octet-stream";

/// Marker value in the `content` field distinguishing a file attachment
/// from an image attachment.
pub const FILE_MARKER: &str = "file";

/// Placeholder shown by the input surface while an upload is in flight.
pub const UPLOADING_PLACEHOLDER: &str = "File is loading please wait for a while...";
