//! Construction options for a sequence.

use serde::{Deserialize, Serialize};

use crate::crdt::buffer::BufferPolicy;
use crate::crdt::codec::Codec;

/// Options fixed when a [`Sequence`](crate::Sequence) is created.
///
/// Every field has a default, so a driver can load a partial JSON document:
///
/// ```rust
/// use rga_sequence::{Codec, SequenceConfig};
///
/// let json = r#"{"codec":"utf8","buffer":{"max_pending":64}}"#;
/// let config = SequenceConfig::from_json(json).unwrap();
/// assert_eq!(config.codec, Codec::Utf8);
/// assert_eq!(config.buffer.max_pending, Some(64));
/// assert!(!config.strict_causal);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SequenceConfig {
    /// Encoding used for element values and size accounting.
    pub codec: Codec,
    /// Reject operations whose reference is unknown instead of buffering them.
    pub strict_causal: bool,
    /// Backlog limits for the causal buffer.
    pub buffer: BufferPolicy,
}

impl SequenceConfig {
    pub fn new(codec: Codec) -> Self {
        SequenceConfig {
            codec,
            ..Default::default()
        }
    }

    pub fn with_codec(mut self, codec: Codec) -> Self {
        self.codec = codec;
        self
    }

    pub fn with_strict_causal(mut self, strict: bool) -> Self {
        self.strict_causal = strict;
        self
    }

    /// Caps the number of buffered operations.
    pub fn with_max_pending(mut self, max_pending: usize) -> Self {
        self.buffer.max_pending = Some(max_pending);
        self
    }

    /// Parses a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
