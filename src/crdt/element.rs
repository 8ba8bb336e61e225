//! Element definition for the sequence CRDT.
//!
//! An element is the materialized effect of one applied insert. Elements are
//! never removed: deleting one only sets its tombstone so later operations can
//! still resolve positional references to it.

use crate::crdt::codec::Value;
use crate::crdt::types::Identifier;

/// Dense index of an element inside the store.
pub(crate) type Slot = usize;

/// Slot of the sentinel element every sequence starts with.
pub(crate) const SENTINEL_SLOT: Slot = 0;

/// One inserted element.
///
/// Besides its identity and payload, an element carries two independent sets
/// of links, all expressed as slots into the owning store:
///
/// - `origin`, the reference it was inserted after, fixed for its lifetime,
///   and `children`, the elements inserted after it, sorted by descending
///   identifier;
/// - `prev`/`next`, its neighbours in visiting order.
#[derive(Debug, Clone)]
pub struct Element {
    pub(crate) id: Identifier,
    pub(crate) origin: Slot,
    pub(crate) value: Option<Value>,
    pub(crate) tombstoned: bool,
    pub(crate) prev: Option<Slot>,
    pub(crate) next: Option<Slot>,
    pub(crate) children: Vec<Slot>,
}

impl Element {
    pub(crate) fn new(id: Identifier, origin: Slot, value: Value) -> Self {
        Element {
            id,
            origin,
            value: Some(value),
            tombstoned: false,
            prev: None,
            next: None,
            children: Vec::new(),
        }
    }

    /// Creates the sentinel element.
    pub(crate) fn sentinel() -> Self {
        Element {
            id: Identifier::sentinel(),
            origin: SENTINEL_SLOT,
            value: None,
            tombstoned: false,
            prev: None,
            next: None,
            children: Vec::new(),
        }
    }

    /// The identifier of the insert that created this element.
    pub fn id(&self) -> &Identifier {
        &self.id
    }

    /// The stored value, or `None` once the element is tombstoned.
    pub fn value(&self) -> Option<Value> {
        self.value
    }

    pub fn is_tombstoned(&self) -> bool {
        self.tombstoned
    }

    /// Returns true if this element is visible (live and not the sentinel).
    pub fn is_live(&self) -> bool {
        !self.tombstoned && !self.id.is_sentinel()
    }

    /// Marks the element deleted and drops its payload.
    ///
    /// Returns the discarded value, or `None` if the element was already a
    /// tombstone.
    pub(crate) fn tombstone(&mut self) -> Option<Value> {
        if self.tombstoned {
            return None;
        }
        self.tombstoned = true;
        self.value.take()
    }
}
