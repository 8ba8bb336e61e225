//! Element storage and visiting-order maintenance.
//!
//! Elements live in one owned `Vec` addressed by dense slots, with a hash
//! index from identifier to slot. Relations between elements (reference,
//! siblings, traversal neighbours) are slots, not pointers.

use std::collections::{HashMap, HashSet};

use tracing::trace;

use crate::crdt::codec::{Codec, Value, varint};
use crate::crdt::element::{Element, SENTINEL_SLOT, Slot};
use crate::crdt::error::{CodecError, Result, SequenceError};
use crate::crdt::types::{Actor, Identifier};

/// Owns every element of a sequence, including tombstones.
///
/// # Placement
///
/// Concurrent inserts after the same reference are siblings. Among siblings a
/// larger identifier sorts closer to the reference, so a new element is
/// spliced directly in front of the first sibling smaller than itself. Only
/// the siblings of the reference are examined; the rest of the sequence is
/// untouched apart from the two neighbouring links.
///
/// An element smaller than every sibling goes after the whole subtree of the
/// smallest one, which is found by walking that subtree's last-child chain.
/// That walk is O(d) for a chain of depth d: a concurrent insert landing
/// behind a long typed run pays for the run once, and later inserts that
/// follow it are O(1) again.
#[derive(Debug, Clone)]
pub struct ElementStore {
    codec: Codec,
    elements: Vec<Element>,
    index: HashMap<Identifier, Slot>,
    actors: HashSet<Actor>,
    live: usize,
    size: usize,
    tail: Slot,
}

impl ElementStore {
    /// Creates a store holding only the sentinel.
    pub fn new(codec: Codec) -> Self {
        let sentinel = Element::sentinel();
        let mut index = HashMap::new();
        index.insert(sentinel.id.clone(), SENTINEL_SLOT);

        ElementStore {
            codec,
            elements: vec![sentinel],
            index,
            actors: HashSet::new(),
            live: 0,
            size: 0,
            tail: SENTINEL_SLOT,
        }
    }

    pub fn codec(&self) -> Codec {
        self.codec
    }

    pub(crate) fn slot_of(&self, id: &Identifier) -> Option<Slot> {
        self.index.get(id).copied()
    }

    pub(crate) fn element(&self, slot: Slot) -> &Element {
        &self.elements[slot]
    }

    /// Looks up an element (the sentinel included) by identifier.
    pub fn get(&self, id: &Identifier) -> Option<&Element> {
        self.slot_of(id).map(|slot| &self.elements[slot])
    }

    pub fn contains(&self, id: &Identifier) -> bool {
        self.index.contains_key(id)
    }

    /// The reference an element was inserted after.
    pub fn reference_of(&self, element: &Element) -> &Identifier {
        &self.elements[element.origin].id
    }

    /// Number of stored elements, tombstones included, sentinel excluded.
    pub fn len(&self) -> usize {
        self.elements.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of live elements.
    pub fn live_len(&self) -> usize {
        self.live
    }

    /// Encoded footprint of the stored elements in bytes.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Creates the element for an insert and splices it into visiting order.
    ///
    /// The caller has already checked that `id` is fresh.
    pub(crate) fn put(
        &mut self,
        id: Identifier,
        origin: Slot,
        value: Value,
    ) -> Result<Slot, CodecError> {
        let payload = self.codec.encoded_len(value)?;
        let id = self.intern(id);
        let slot = self.elements.len();

        let siblings = &self.elements[origin].children;
        let pos = siblings.partition_point(|&s| self.elements[s].id > id);
        let prev = match siblings.get(pos) {
            Some(&next_sibling) => self.elements[next_sibling].prev.unwrap_or(origin),
            None if pos == 0 => origin,
            None => self.subtree_last(siblings[pos - 1]),
        };
        trace!(%id, sibling_rank = pos, "splicing element");

        self.size += varint::len_u64(id.counter) + payload;
        self.index.insert(id.clone(), slot);
        self.elements.push(Element::new(id, origin, value));
        self.elements[origin].children.insert(pos, slot);
        self.link_after(prev, slot);
        self.live += 1;
        Ok(slot)
    }

    /// Tombstones the element at `slot`; returns true if the flag flipped.
    pub(crate) fn tombstone_slot(&mut self, slot: Slot) -> bool {
        match self.elements[slot].tombstone() {
            Some(value) => {
                self.size -= self.codec.encoded_len(value).unwrap_or(0);
                self.live -= 1;
                true
            }
            None => false,
        }
    }

    /// Tombstones an element by identifier; returns true if the flag flipped.
    pub fn tombstone(&mut self, id: &Identifier) -> Result<bool> {
        match self.slot_of(id) {
            Some(slot) if slot != SENTINEL_SLOT => Ok(self.tombstone_slot(slot)),
            _ => Err(SequenceError::NotFound { id: id.clone() }),
        }
    }

    /// Elements in visiting order, tombstones included, sentinel excluded.
    pub fn visit(&self) -> Visit<'_> {
        Visit {
            store: self,
            cursor: self.elements[SENTINEL_SLOT].next,
        }
    }

    /// Last element in visiting order, or the sentinel when the store is empty.
    pub fn last(&self) -> &Element {
        &self.elements[self.tail]
    }

    /// Elements in creation order, sentinel excluded.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter().skip(1)
    }

    /// Swaps the caller's actor for the interned copy so every identifier
    /// from one actor shares the same bytes. The first element from an actor
    /// also pays for the actor bytes.
    fn intern(&mut self, id: Identifier) -> Identifier {
        if let Some(actor) = self.actors.get(&id.actor) {
            return Identifier {
                counter: id.counter,
                actor: actor.clone(),
            };
        }
        self.size += varint::len_u64(id.actor.len() as u64) + id.actor.len();
        self.actors.insert(id.actor.clone());
        id
    }

    /// Last element, in visiting order, of the subtree rooted at `slot`.
    fn subtree_last(&self, mut slot: Slot) -> Slot {
        // Children are sorted descending, so the smallest one is visited last.
        while let Some(&last) = self.elements[slot].children.last() {
            slot = last;
        }
        slot
    }

    fn link_after(&mut self, prev: Slot, slot: Slot) {
        let next = self.elements[prev].next;
        self.elements[slot].prev = Some(prev);
        self.elements[slot].next = next;
        self.elements[prev].next = Some(slot);
        match next {
            Some(next) => self.elements[next].prev = Some(slot),
            None => self.tail = slot,
        }
    }
}

/// Iterator over stored elements in visiting order.
#[derive(Debug, Clone)]
pub struct Visit<'a> {
    store: &'a ElementStore,
    cursor: Option<Slot>,
}

impl<'a> Iterator for Visit<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        let element = self.store.element(self.cursor?);
        self.cursor = element.next;
        Some(element)
    }
}
