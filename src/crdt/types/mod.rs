//! Type definitions for the sequence CRDT.
//!
//! This module contains the identity types used throughout the implementation,
//! organized into focused submodules.

pub mod clock;
pub mod replica;
pub mod unique_id;

pub use clock::Clock;
pub use replica::Actor;
pub use unique_id::Identifier;
