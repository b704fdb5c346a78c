//! # parley-feed
//!
//! Realtime change-feed reconciliation: folds batches of added / modified /
//! removed document events into an ordered, de-duplicated in-memory
//! projection ready for rendering.
//!
//! Two feeds exist, one per entity collection:
//!
//! - [`TopicFeed`] maintains the live topic list in snapshot order.
//! - [`MessageFeed`] maintains one topic's message thread ordered by send
//!   time, resolving image attachments through an injected
//!   [`AttachmentResolver`] before a message becomes visible.
//!
//! Malformed documents and unresolvable attachments never surface as errors:
//! the offending event is dropped with a log notice and the projection stays
//! as it was.

pub mod feed;
pub mod projection;
pub mod resolver;

pub use feed::{MessageFeed, TopicFeed};
pub use projection::{Entity, Projection};
pub use resolver::{AttachmentResolver, ResolveError};
