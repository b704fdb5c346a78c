use thiserror::Error;

/// Errors preparing an attachment payload for upload.
#[derive(Error, Debug)]
pub enum MediaError {
    /// The payload could not be decoded or re-encoded as an image.
    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    /// The payload decoded to an image with a zero dimension.
    #[error("Image has empty dimensions")]
    EmptyImage,
}
