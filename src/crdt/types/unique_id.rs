//! Identifier implementation for sequence elements and operations.
//!
//! An `Identifier` names every operation applied to a sequence and, for
//! inserts, the element the operation creates. Identifiers provide both
//! identity (hash lookups) and the deterministic order used to break ties
//! between concurrent inserts.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::crdt::types::replica::Actor;

/// A `(counter, actor)` pair naming one operation.
///
/// # Ordering
///
/// Identifiers are ordered first by counter, then by the actor bytes
/// lexicographically. The order never depends on wall-clock time or on the
/// order in which operations arrive. The sentinel `(0, "")` is the minimum.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Identifier {
    /// Per-actor monotonically assigned counter
    pub counter: u64,
    /// The replica that produced the operation
    pub actor: Actor,
}

impl Identifier {
    /// Creates a new identifier from a counter and actor
    pub fn new(counter: u64, actor: impl Into<Actor>) -> Self {
        Identifier {
            counter,
            actor: actor.into(),
        }
    }

    /// The reserved identifier meaning "before the first element".
    pub fn sentinel() -> Self {
        Identifier {
            counter: 0,
            actor: Actor::empty(),
        }
    }

    /// Returns true if this is the sentinel identifier.
    pub fn is_sentinel(&self) -> bool {
        self.counter == 0 && self.actor.is_empty()
    }

    /// Gets the counter value
    pub fn counter(&self) -> u64 {
        self.counter
    }

    /// Gets the actor
    pub fn actor(&self) -> &Actor {
        &self.actor
    }
}

impl Default for Identifier {
    fn default() -> Self {
        Identifier::sentinel()
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_sentinel() {
            f.write_str("sentinel")
        } else {
            write!(f, "{}@{}", self.counter, self.actor)
        }
    }
}
