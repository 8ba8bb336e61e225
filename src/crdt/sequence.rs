//! Core sequence engine.
//!
//! This module contains the [`Sequence`] struct, which applies insert and
//! delete operations from any replica and answers size, count and traversal
//! queries. Two sequences that apply the same set of operations end up with
//! the same visiting order, whatever order the operations arrived in.

use std::collections::VecDeque;
use std::fmt;

use tracing::debug;

use crate::crdt::buffer::CausalBuffer;
use crate::crdt::codec::{Codec, Value};
use crate::crdt::config::SequenceConfig;
use crate::crdt::element::Element;
use crate::crdt::error::{Result, SequenceError};
use crate::crdt::operation::{OpKind, Operation, RawOperation};
use crate::crdt::store::{ElementStore, Visit};
use crate::crdt::types::Identifier;

/// What a successful [`Sequence::insert`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The operation was applied, together with any buffered operations it
    /// unblocked.
    Applied {
        /// Elements created.
        created: usize,
        /// Elements newly tombstoned.
        tombstoned: usize,
    },
    /// The reference is not known yet; the operation is buffered.
    Pending,
}

/// A replicated growable array.
///
/// # Design
///
/// - Elements are kept in an [`ElementStore`] and never removed; deletes only
///   set a tombstone
/// - Concurrent inserts after the same reference are ordered by identifier,
///   larger first
/// - Operations whose reference has not arrived wait in a [`CausalBuffer`]
///   and are replayed as soon as it does
/// - Every mutating call validates first, so an error leaves the sequence
///   untouched
///
/// The engine assumes a single writer. Use
/// [`SharedSequence`](crate::SharedSequence) to share one across threads.
#[derive(Debug, Clone)]
pub struct Sequence {
    config: SequenceConfig,
    store: ElementStore,
    buffer: CausalBuffer,
}

impl Sequence {
    /// Creates an empty sequence that encodes values with `codec`.
    pub fn new(codec: Codec) -> Self {
        Sequence::with_config(SequenceConfig::new(codec))
    }

    pub fn with_config(config: SequenceConfig) -> Self {
        Sequence {
            config,
            store: ElementStore::new(config.codec),
            buffer: CausalBuffer::new(config.buffer),
        }
    }

    pub fn config(&self) -> &SequenceConfig {
        &self.config
    }

    pub fn codec(&self) -> Codec {
        self.config.codec
    }

    /// Applies an operation, or buffers it until its reference arrives.
    ///
    /// # Errors
    ///
    /// * `DuplicateOperation` - an insert reuses an applied or buffered identifier
    /// * `NotFound` - a delete targets the sentinel, an insert references
    ///   itself, or the reference is unknown under strict causal delivery
    /// * `UnresolvableReference` - the causal buffer is full
    /// * `InvalidValue` - the codec cannot represent the inserted value
    pub fn insert(&mut self, op: Operation) -> Result<Outcome> {
        self.validate(&op)?;

        if self.config.strict_causal && !self.store.contains(&op.reference) {
            return Err(SequenceError::NotFound { id: op.reference });
        }
        let Some(op) = self.buffer.offer(op, &self.store)? else {
            return Ok(Outcome::Pending);
        };

        let mut created = 0;
        let mut tombstoned = 0;
        let mut resolved = VecDeque::new();
        self.apply(op, &mut resolved, &mut created, &mut tombstoned)?;

        while let Some(id) = resolved.pop_front() {
            for op in self.buffer.take(&id) {
                self.apply(op, &mut resolved, &mut created, &mut tombstoned)?;
            }
        }
        Ok(Outcome::Applied { created, tombstoned })
    }

    /// Converts an untyped operation and applies it.
    pub fn insert_raw(&mut self, raw: RawOperation) -> Result<Outcome> {
        self.insert(Operation::try_from(raw)?)
    }

    fn validate(&self, op: &Operation) -> Result<()> {
        match op.kind {
            OpKind::Insert { value } => {
                self.config.codec.encoded_len(value)?;
                if self.store.contains(&op.id) || self.buffer.contains_insert(&op.id) {
                    return Err(SequenceError::DuplicateOperation { id: op.id.clone() });
                }
                if op.reference == op.id {
                    return Err(SequenceError::NotFound {
                        id: op.reference.clone(),
                    });
                }
            }
            OpKind::Delete => {
                if op.reference.is_sentinel() {
                    return Err(SequenceError::NotFound {
                        id: op.reference.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Applies an operation whose reference is known.
    ///
    /// Values are validated before an operation is applied or buffered, so
    /// nothing here fails part way through a drain.
    fn apply(
        &mut self,
        op: Operation,
        resolved: &mut VecDeque<Identifier>,
        created: &mut usize,
        tombstoned: &mut usize,
    ) -> Result<()> {
        let slot = self
            .store
            .slot_of(&op.reference)
            .ok_or_else(|| SequenceError::NotFound {
                id: op.reference.clone(),
            })?;

        match op.kind {
            OpKind::Insert { value } => {
                let new_slot = self.store.put(op.id, slot, value)?;
                resolved.push_back(self.store.element(new_slot).id.clone());
                *created += 1;
            }
            OpKind::Delete => {
                if self.store.tombstone_slot(slot) {
                    *tombstoned += 1;
                } else {
                    debug!(target_id = %op.reference, "element already tombstoned");
                }
            }
        }
        Ok(())
    }

    /// Encoded footprint of all stored elements in bytes.
    ///
    /// Counts each distinct actor once, each element's identity, and the
    /// encoded value of live elements. Tombstones keep their identity but
    /// their payload is discarded, so deleting shrinks the size. Buffered
    /// operations are not counted.
    pub fn size(&self) -> usize {
        self.store.size()
    }

    /// Number of live elements.
    pub fn row_count(&self) -> usize {
        self.store.live_len()
    }

    /// Number of stored elements, tombstones included.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }

    /// Number of operations waiting in the causal buffer.
    pub fn pending_len(&self) -> usize {
        self.buffer.len()
    }

    /// References that buffered operations are still waiting for.
    pub fn missing_references(&self) -> Vec<Identifier> {
        self.buffer.missing_references()
    }

    /// Gives up on every buffered operation, returning them to the caller.
    pub fn take_unresolved(&mut self) -> Vec<Operation> {
        let ops = self.buffer.take_all();
        if !ops.is_empty() {
            debug!(count = ops.len(), "discarding unresolved operations");
        }
        ops
    }

    /// Returns true if an element with this identifier has been created.
    pub fn contains(&self, id: &Identifier) -> bool {
        !id.is_sentinel() && self.store.contains(id)
    }

    /// Looks up an element, live or tombstoned.
    pub fn get(&self, id: &Identifier) -> Option<&Element> {
        self.store.get(id).filter(|element| !element.id.is_sentinel())
    }

    /// The reference an element was inserted after.
    pub fn reference_of(&self, id: &Identifier) -> Option<&Identifier> {
        self.get(id).map(|element| self.store.reference_of(element))
    }

    pub(crate) fn store(&self) -> &ElementStore {
        &self.store
    }

    /// Live elements in visiting order.
    ///
    /// The iterator is lazy and borrows the sequence; call `iter` again to
    /// restart from the beginning.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            visit: self.store.visit(),
        }
    }

    /// Live values in visiting order.
    pub fn values(&self) -> impl Iterator<Item = Value> + '_ {
        self.iter().map(|(_, value)| value)
    }

    /// Every stored element in visiting order, tombstones included.
    pub fn elements(&self) -> Visit<'_> {
        self.store.visit()
    }

    /// Identifier of the live element at `index` in visiting order.
    ///
    /// This walks the sequence, so it is O(n).
    pub fn id_at(&self, index: usize) -> Option<&Identifier> {
        self.iter().nth(index).map(|(id, _)| id)
    }

    /// Identifier of the last element in visiting order, or the sentinel when
    /// nothing has been inserted. Appending after it adds to the end.
    pub fn last_id(&self) -> &Identifier {
        &self.store.last().id
    }
}

impl Default for Sequence {
    fn default() -> Self {
        Sequence::with_config(SequenceConfig::default())
    }
}

/// Renders live values as text; scalars that are not code points become U+FFFD.
impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use fmt::Write;
        self.values().try_for_each(|value| {
            f.write_char(value.as_char().unwrap_or(char::REPLACEMENT_CHARACTER))
        })
    }
}

/// Iterator over live `(identifier, value)` pairs in visiting order.
#[derive(Debug, Clone)]
pub struct Iter<'a> {
    visit: Visit<'a>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a Identifier, Value);

    fn next(&mut self) -> Option<Self::Item> {
        self.visit
            .by_ref()
            .find_map(|element| match (element.tombstoned, element.value) {
                (false, Some(value)) => Some((&element.id, value)),
                _ => None,
            })
    }
}

impl<'a> IntoIterator for &'a Sequence {
    type Item = (&'a Identifier, Value);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
