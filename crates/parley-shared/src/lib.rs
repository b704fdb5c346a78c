//! # parley-shared
//!
//! Domain types shared across the Parley client crates: entity ids, senders,
//! topics, messages, realtime change events, and the document field contract
//! spoken with the backing document store.
//!
//! Nothing in this crate performs I/O.  Conversions between entities and
//! store documents are pure and fail with [`RecordError`] when a document is
//! missing required fields.

pub mod change;
pub mod constants;
pub mod message;
pub mod topic;
pub mod types;

mod error;

pub use change::{ChangeKind, DocumentChange, DocumentSnapshot};
pub use error::RecordError;
pub use message::{Message, MessagePayload};
pub use topic::Topic;
pub use types::{BlobAddress, DocumentId, Sender, UserId};
