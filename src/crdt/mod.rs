//! Sequence CRDT implementation module.
//!
//! This module contains the replicated sequence engine and all its supporting
//! types: identifiers, the value codec, element storage, and the causal
//! buffer that holds operations delivered ahead of their dependencies.

pub mod buffer;
pub mod codec;
pub mod config;
pub mod element;
pub mod error;
pub mod operation;
pub mod record;
pub mod sequence;
pub mod shared;
pub mod store;
pub mod types;

// Re-export the main public API
pub use buffer::{BufferPolicy, CausalBuffer};
pub use codec::{Codec, Value};
pub use config::SequenceConfig;
pub use element::Element;
pub use error::{CodecError, Result, SequenceError};
pub use operation::{OpKind, Operation, RawOperation};
pub use record::ElementRecord;
pub use sequence::{Iter, Outcome, Sequence};
pub use shared::SharedSequence;
pub use store::ElementStore;
pub use types::{Actor, Clock, Identifier};
