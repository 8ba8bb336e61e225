//! Error types returned by the sequence engine and the value codec.

use thiserror::Error;

use crate::crdt::types::Identifier;

/// Failures while encoding or decoding a value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// The input ended in the middle of a value.
    #[error("input truncated at offset {offset}")]
    Truncated {
        /// Offset where decoding started.
        offset: usize,
    },

    /// A varint carried more than 64 bits of payload.
    #[error("varint at offset {offset} overflows 64 bits")]
    Overflow {
        /// Offset where decoding started.
        offset: usize,
    },

    /// The value cannot be written with the chosen codec.
    #[error("value {value:#x} is not representable by the {codec} codec")]
    Unrepresentable {
        /// The raw scalar.
        value: u64,
        /// Name of the codec that rejected it.
        codec: &'static str,
    },

    /// The bytes do not form a valid encoding.
    #[error("invalid encoding at offset {offset}")]
    Invalid {
        /// Offset of the offending byte.
        offset: usize,
    },
}

/// Errors returned by mutating calls on a [`Sequence`](crate::Sequence).
///
/// On any error the sequence is left exactly as it was before the call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SequenceError {
    /// An insert reused an identifier that is already applied or buffered.
    #[error("duplicate operation {id}")]
    DuplicateOperation {
        /// The reused identifier.
        id: Identifier,
    },

    /// The operation targets an identifier that can never become valid.
    #[error("identifier {id} not found")]
    NotFound {
        /// The missing identifier.
        id: Identifier,
    },

    /// The operation kind is neither insert nor delete.
    #[error("unknown op kind {kind}")]
    UnknownOpKind {
        /// The raw kind tag.
        kind: i64,
    },

    /// The causal buffer gave up waiting for a reference.
    #[error("reference {reference} could not be resolved")]
    UnresolvableReference {
        /// The reference that never arrived.
        reference: Identifier,
    },

    /// The inserted value is not accepted by the sequence's codec.
    #[error("invalid value: {0}")]
    InvalidValue(#[from] CodecError),
}

/// Convenience alias used across the crate.
pub type Result<T, E = SequenceError> = std::result::Result<T, E>;
