//! # parley-media
//!
//! Attachment payload pre-processing.  Images are downscaled so neither side
//! exceeds the upload bound, then re-encoded as JPEG at a fixed quality: a
//! one-way, lossy, deterministic transform.  Files are never transformed.

pub mod scale;

mod error;

pub use error::MediaError;
pub use scale::{prepare_image_for_upload, scaled_dimensions};
