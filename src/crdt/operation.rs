//! Edit operations accepted by a sequence.

use serde::{Deserialize, Serialize};

use crate::crdt::codec::Value;
use crate::crdt::error::SequenceError;
use crate::crdt::types::{Actor, Identifier};

/// Raw kind tag of an insert in [`RawOperation`].
pub const KIND_INSERT: i64 = 0;
/// Raw kind tag of a delete in [`RawOperation`].
pub const KIND_DELETE: i64 = 1;

/// What an operation does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OpKind {
    /// Create a new element holding `value` after the reference.
    Insert { value: Value },
    /// Tombstone the referenced element.
    Delete,
}

/// A single edit.
///
/// `reference` is the causal predecessor: for an insert, the element the new
/// element follows (or the sentinel); for a delete, the element to remove.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Operation {
    pub id: Identifier,
    pub reference: Identifier,
    #[serde(flatten)]
    pub kind: OpKind,
}

impl Operation {
    /// Builds an insert of `value` after `reference`.
    pub fn insert(id: Identifier, reference: Identifier, value: impl Into<Value>) -> Self {
        Operation {
            id,
            reference,
            kind: OpKind::Insert {
                value: value.into(),
            },
        }
    }

    /// Builds a delete of `target`.
    pub fn delete(id: Identifier, target: Identifier) -> Self {
        Operation {
            id,
            reference: target,
            kind: OpKind::Delete,
        }
    }

    pub fn is_insert(&self) -> bool {
        matches!(self.kind, OpKind::Insert { .. })
    }

    /// The value carried by an insert.
    pub fn value(&self) -> Option<Value> {
        match self.kind {
            OpKind::Insert { value } => Some(value),
            OpKind::Delete => None,
        }
    }
}

/// The untyped shape operations take in edit traces and driver input.
///
/// `kind` is `0` for insert and `1` for delete; `value` is ignored for
/// deletes. An empty `ref_actor` with `ref_counter == 0` names the sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawOperation {
    pub counter: u64,
    pub actor: Actor,
    pub ref_counter: u64,
    #[serde(default)]
    pub ref_actor: Actor,
    pub kind: i64,
    #[serde(default)]
    pub value: u64,
}

impl TryFrom<RawOperation> for Operation {
    type Error = SequenceError;

    fn try_from(raw: RawOperation) -> Result<Self, Self::Error> {
        let kind = match raw.kind {
            KIND_INSERT => OpKind::Insert {
                value: Value::new(raw.value),
            },
            KIND_DELETE => OpKind::Delete,
            kind => return Err(SequenceError::UnknownOpKind { kind }),
        };
        Ok(Operation {
            id: Identifier::new(raw.counter, raw.actor),
            reference: Identifier::new(raw.ref_counter, raw.ref_actor),
            kind,
        })
    }
}

impl From<&Operation> for RawOperation {
    fn from(op: &Operation) -> Self {
        let (kind, value) = match op.kind {
            OpKind::Insert { value } => (KIND_INSERT, value.get()),
            OpKind::Delete => (KIND_DELETE, 0),
        };
        RawOperation {
            counter: op.id.counter,
            actor: op.id.actor.clone(),
            ref_counter: op.reference.counter,
            ref_actor: op.reference.actor.clone(),
            kind,
            value,
        }
    }
}
