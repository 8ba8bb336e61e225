//! Causal buffer for operations that arrive before their reference.
//!
//! Out-of-order delivery is normal for a replicated sequence: an insert may
//! show up before the element it follows. Such operations wait here, keyed by
//! the reference they need, until the sequence creates that element.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::crdt::error::{Result, SequenceError};
use crate::crdt::operation::Operation;
use crate::crdt::store::ElementStore;
use crate::crdt::types::Identifier;

/// How much the causal buffer may hold before it gives up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferPolicy {
    /// Maximum number of buffered operations; `None` means unbounded.
    pub max_pending: Option<usize>,
}

/// Operations waiting for a missing reference.
#[derive(Debug, Clone, Default)]
pub struct CausalBuffer {
    policy: BufferPolicy,
    waiting: HashMap<Identifier, Vec<Operation>>,
    pending_inserts: HashSet<Identifier>,
    len: usize,
}

impl CausalBuffer {
    pub fn new(policy: BufferPolicy) -> Self {
        CausalBuffer {
            policy,
            ..Default::default()
        }
    }

    /// Routes an operation: returns it back if its reference already resolves
    /// in `store`, otherwise buffers it and returns `None`.
    ///
    /// Fails with `UnresolvableReference` when the backlog is full; the
    /// operation is not buffered in that case.
    pub fn offer(&mut self, op: Operation, store: &ElementStore) -> Result<Option<Operation>> {
        if store.contains(&op.reference) {
            return Ok(Some(op));
        }
        if let Some(max) = self.policy.max_pending {
            if self.len >= max {
                warn!(reference = %op.reference, pending = self.len, "causal buffer full");
                return Err(SequenceError::UnresolvableReference {
                    reference: op.reference,
                });
            }
        }

        debug!(id = %op.id, reference = %op.reference, "buffering operation");
        if op.is_insert() {
            self.pending_inserts.insert(op.id.clone());
        }
        self.waiting.entry(op.reference.clone()).or_default().push(op);
        self.len += 1;
        Ok(None)
    }

    /// Returns true if an insert with this identifier is buffered.
    pub fn contains_insert(&self, id: &Identifier) -> bool {
        self.pending_inserts.contains(id)
    }

    /// Removes every operation waiting on `reference`, in ascending
    /// identifier order with inserts ahead of deletes sharing an identifier.
    pub fn take(&mut self, reference: &Identifier) -> Vec<Operation> {
        let Some(mut ops) = self.waiting.remove(reference) else {
            return Vec::new();
        };
        ops.sort_by(|a, b| a.id.cmp(&b.id).then(b.is_insert().cmp(&a.is_insert())));
        for op in ops.iter().filter(|op| op.is_insert()) {
            self.pending_inserts.remove(&op.id);
        }
        self.len -= ops.len();
        debug!(%reference, released = ops.len(), "draining buffered operations");
        ops
    }

    /// Removes and returns every buffered operation, ordered by identifier.
    pub fn take_all(&mut self) -> Vec<Operation> {
        let mut ops: Vec<Operation> = self.waiting.drain().flat_map(|(_, ops)| ops).collect();
        ops.sort_by(|a, b| a.id.cmp(&b.id));
        self.pending_inserts.clear();
        self.len = 0;
        ops
    }

    /// References that buffered operations are waiting on, sorted.
    pub fn missing_references(&self) -> Vec<Identifier> {
        let mut refs: Vec<Identifier> = self.waiting.keys().cloned().collect();
        refs.sort();
        refs
    }

    /// Number of buffered operations.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
