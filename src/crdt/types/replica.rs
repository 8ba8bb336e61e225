//! Actor type identifying the replica that originated an operation.
//!
//! Actors are opaque byte strings. They only matter for equality and for the
//! lexicographic tie-break between identifiers that share a counter.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// The identity of a replica or editing session.
///
/// Each participant in a collaborative session should use a distinct actor so
/// that operations sharing a counter can still be told apart. The bytes are
/// shared, so cloning an `Actor` never copies them.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Actor(Arc<[u8]>);

impl Actor {
    /// Creates an actor from raw bytes.
    pub fn new(bytes: impl AsRef<[u8]>) -> Self {
        Actor(Arc::from(bytes.as_ref()))
    }

    /// The empty actor, used only by the sentinel identifier.
    pub fn empty() -> Self {
        Actor::default()
    }

    /// Gets the raw actor bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Number of bytes in the actor.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for Actor {
    fn from(value: &str) -> Self {
        Actor::new(value.as_bytes())
    }
}

impl From<String> for Actor {
    fn from(value: String) -> Self {
        Actor::new(value.into_bytes())
    }
}

impl From<&[u8]> for Actor {
    fn from(value: &[u8]) -> Self {
        Actor::new(value)
    }
}

impl From<Vec<u8>> for Actor {
    fn from(value: Vec<u8>) -> Self {
        Actor(Arc::from(value))
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match std::str::from_utf8(&self.0) {
            Ok(text) => f.write_str(text),
            Err(_) => self.0.iter().try_for_each(|b| write!(f, "{b:02x}")),
        }
    }
}

impl fmt::Debug for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Actor({self})")
    }
}
