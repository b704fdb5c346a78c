//! Ordered, de-duplicated materialization of an entity collection.

use parley_shared::{DocumentId, Message, Topic};

/// An entity the feed can project: identified by an optional store id, with
/// a type-specific display order.
pub trait Entity: Clone {
    fn id(&self) -> Option<&DocumentId>;

    /// Restore the type's display order after a mutation.  The sort must be
    /// stable so equal keys keep their insertion order.  The default keeps
    /// snapshot order untouched.
    fn resort(_items: &mut Vec<Self>) {}

    /// Whether `self` is a local pending instance that the persisted `echo`
    /// confirms.  Types without optimistic sends never match.
    fn confirms_pending(&self, _echo: &Self) -> bool {
        false
    }
}

impl Entity for Topic {
    fn id(&self) -> Option<&DocumentId> {
        self.id.as_ref()
    }
}

impl Entity for Message {
    fn id(&self) -> Option<&DocumentId> {
        self.id.as_ref()
    }

    fn resort(items: &mut Vec<Self>) {
        items.sort_by(|a, b| a.sent_at.cmp(&b.sent_at));
    }

    fn confirms_pending(&self, echo: &Self) -> bool {
        self.id.is_none() && self.sender.id == echo.sender.id && self.payload == echo.payload
    }
}

/// The local ordered, de-duplicated projection of one collection.
///
/// Invariant: no two items share the same non-`None` id.
#[derive(Debug, Clone)]
pub struct Projection<T: Entity> {
    items: Vec<T>,
}

impl<T: Entity> Default for Projection<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity> Projection<T> {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Read-only snapshot in display order.
    pub fn snapshot(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains_id(&self, id: &DocumentId) -> bool {
        self.items.iter().any(|item| item.id() == Some(id))
    }

    /// Apply an `added` event.  Duplicate delivery of an already-present id
    /// is skipped; a matching local pending instance is replaced by the
    /// persisted echo instead of double-inserting.  Returns whether the
    /// projection changed.
    pub fn insert(&mut self, entity: T) -> bool {
        if let Some(id) = entity.id() {
            if self.contains_id(id) {
                return false;
            }
        }

        if let Some(pos) = self
            .items
            .iter()
            .position(|item| item.confirms_pending(&entity))
        {
            self.items[pos] = entity;
        } else {
            self.items.push(entity);
        }
        T::resort(&mut self.items);
        true
    }

    /// Apply a `modified` event: replace the entity with the matching id in
    /// place.  An absent id is a no-op; modify never inserts.
    pub fn replace(&mut self, entity: T) -> bool {
        let Some(id) = entity.id() else {
            return false;
        };
        let Some(pos) = self.items.iter().position(|item| item.id() == Some(id)) else {
            return false;
        };
        self.items[pos] = entity;
        T::resort(&mut self.items);
        true
    }

    /// Apply a `removed` event.  An absent id is a no-op.
    pub fn remove(&mut self, id: &DocumentId) -> bool {
        let Some(pos) = self.items.iter().position(|item| item.id() == Some(id)) else {
            return false;
        };
        self.items.remove(pos);
        true
    }

    /// Register a local pending instance (no id yet).  It occupies its slot
    /// in display order until the persisted echo arrives or it is retracted.
    pub fn insert_pending(&mut self, entity: T) {
        self.items.push(entity);
        T::resort(&mut self.items);
    }

    /// Retract the first pending instance that `like` would confirm.  Used
    /// to roll back an optimistic send whose persistence failed.
    pub fn remove_matching_pending(&mut self, like: &T) -> bool {
        let Some(pos) = self
            .items
            .iter()
            .position(|item| item.confirms_pending(like))
        else {
            return false;
        };
        self.items.remove(pos);
        true
    }
}
