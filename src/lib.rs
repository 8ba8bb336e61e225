//! # RGA Sequence - Replicated Growable Array
//!
//! A Conflict-free Replicated Data Type (CRDT) for ordered sequences, suitable
//! for collaborative text or list editing. Replicas apply local and remote
//! insert and delete operations in any order and converge to the same
//! sequence without coordination.
//!
//! ## Features
//!
//! - **Conflict-free**: concurrent inserts at the same position are ordered by
//!   a fixed identifier tie-break, so every replica agrees
//! - **Out-of-order delivery**: operations that arrive before the element they
//!   reference are buffered and replayed once it shows up
//! - **Tombstone-based deletion**: deleted elements keep their identity so later
//!   operations can still reference them
//! - **Compact**: values are stored with a variable-length codec, so size tracks
//!   content rather than edit history
//!
//! ## Example
//!
//! ```rust
//! use rga_sequence::{Codec, Identifier, Operation, Sequence};
//!
//! let mut seq = Sequence::new(Codec::VarInt);
//! let h = Identifier::new(1, "a");
//! let i = Identifier::new(2, "a");
//!
//! seq.insert(Operation::insert(h.clone(), Identifier::sentinel(), 'h')).unwrap();
//! seq.insert(Operation::insert(i, h.clone(), 'i')).unwrap();
//! assert_eq!(seq.to_string(), "hi");
//!
//! seq.insert(Operation::delete(Identifier::new(3, "a"), h)).unwrap();
//! assert_eq!(seq.to_string(), "i");
//! assert_eq!(seq.row_count(), 1);
//! ```

pub mod crdt;

// Re-export the main public API from the CRDT module
pub use crdt::codec::varint;
pub use crdt::{Actor, Clock, Identifier};
pub use crdt::{BufferPolicy, Codec, CodecError, SequenceConfig, Value};
pub use crdt::{Element, ElementRecord, Iter, OpKind, Operation, Outcome, RawOperation};
pub use crdt::{Result, Sequence, SequenceError, SharedSequence};
