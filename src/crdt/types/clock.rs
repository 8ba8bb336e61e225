//! Lamport clock for generating fresh identifiers.
//!
//! A replica uses a `Clock` to name its local operations. Observing remote
//! identifiers keeps the counter ahead of everything the replica has seen, so
//! a local insert typed after a remote one sorts after it.

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use crate::crdt::types::replica::Actor;
use crate::crdt::types::unique_id::Identifier;

/// A thread-safe clock for generating identifiers
#[derive(Debug)]
pub struct Clock {
    counter: AtomicU64,
    actor: Actor,
}

impl Clock {
    /// Creates a new clock. The first identifier it hands out has counter 1.
    pub fn new(actor: impl Into<Actor>) -> Self {
        Clock {
            counter: AtomicU64::new(0),
            actor: actor.into(),
        }
    }

    /// Generates the next identifier for this actor
    pub fn tick(&self) -> Identifier {
        let counter = self.counter.fetch_add(1, AtomicOrdering::SeqCst) + 1;
        Identifier {
            counter,
            actor: self.actor.clone(),
        }
    }

    /// Advances the clock past a received identifier.
    pub fn observe(&self, received: &Identifier) {
        self.counter
            .fetch_max(received.counter, AtomicOrdering::SeqCst);
    }

    /// Gets the current counter value
    pub fn current(&self) -> u64 {
        self.counter.load(AtomicOrdering::SeqCst)
    }

    /// Gets the actor
    pub fn actor(&self) -> &Actor {
        &self.actor
    }
}
