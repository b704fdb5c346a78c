//! # parley-client
//!
//! The engine of the Parley chat client.  A UI embeds this crate, supplies
//! the backend collaborators ([`RealtimeStore`], [`BlobStore`],
//! [`IdentityProvider`], [`PreferenceStore`]), and drives it through three
//! services:
//!
//! - [`UserSession`]: anonymous sign-in under a chosen display name.
//! - [`TopicList`]: the live list of discussion topics.
//! - [`Conversation`]: one open topic thread: ordered message snapshots,
//!   optimistic text sends, and serialized attachment uploads.
//!
//! Rendering, pickers, and notifications stay on the UI side; the services
//! expose snapshots to draw and intents to call.

pub mod backend;
pub mod config;
pub mod conversation;
pub mod logging;
pub mod memory;
pub mod session;
pub mod topics;
pub mod upload;

mod error;

pub use backend::{BlobResolver, BlobStore, IdentityProvider, PreferenceStore, RealtimeStore};
pub use config::ClientConfig;
pub use conversation::Conversation;
pub use error::{BackendError, ClientError};
pub use memory::MemoryBackend;
pub use session::UserSession;
pub use topics::TopicList;
pub use upload::{AttachmentPayload, AttachmentUploadCoordinator, UploadGate};
