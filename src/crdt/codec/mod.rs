//! Compact value encoding.
//!
//! Element values are domain scalars (usually Unicode code points). A
//! [`Codec`] turns them into a self-delimiting byte form so they can be packed
//! back to back without separators, and so the size of a sequence tracks its
//! content rather than a fixed per-element overhead.

pub mod varint;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::crdt::error::CodecError;

/// A scalar stored in one sequence element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Value(u64);

impl Value {
    pub const fn new(raw: u64) -> Self {
        Value(raw)
    }

    /// Gets the raw scalar
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Interprets the scalar as a Unicode code point.
    pub fn as_char(self) -> Option<char> {
        u32::try_from(self.0).ok().and_then(char::from_u32)
    }
}

impl From<char> for Value {
    fn from(value: char) -> Self {
        Value(u64::from(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value(u64::from(value))
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Value(value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_char() {
            Some(ch) => write!(f, "{ch:?}"),
            None => write!(f, "{:#x}", self.0),
        }
    }
}

/// The encoding a sequence uses for its values.
///
/// Every variant round-trips exactly, reports how many bytes a decode
/// consumed, and never grows a value beyond a small constant factor of its
/// minimal binary width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Codec {
    /// Unsigned LEB128; any `u64`.
    #[default]
    VarInt,
    /// UTF-8; Unicode scalar values only.
    Utf8,
}

impl Codec {
    /// Short name used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            Codec::VarInt => "varint",
            Codec::Utf8 => "utf8",
        }
    }

    /// Number of bytes `value` occupies once encoded.
    pub fn encoded_len(self, value: Value) -> Result<usize, CodecError> {
        match self {
            Codec::VarInt => Ok(varint::len_u64(value.get())),
            Codec::Utf8 => self.to_char(value).map(char::len_utf8),
        }
    }

    /// Appends the encoding of `value` to `out`, returning the bytes written.
    pub fn encode(self, value: Value, out: &mut Vec<u8>) -> Result<usize, CodecError> {
        match self {
            Codec::VarInt => Ok(varint::encode_u64(value.get(), out)),
            Codec::Utf8 => {
                let ch = self.to_char(value)?;
                let mut buf = [0u8; 4];
                let encoded = ch.encode_utf8(&mut buf);
                out.extend_from_slice(encoded.as_bytes());
                Ok(encoded.len())
            }
        }
    }

    /// Encodes a single value into a fresh buffer.
    pub fn encode_to_vec(self, value: Value) -> Result<Vec<u8>, CodecError> {
        let mut out = Vec::with_capacity(self.encoded_len(value)?);
        self.encode(value, &mut out)?;
        Ok(out)
    }

    /// Decodes the value starting at `offset`, returning it with the number of
    /// bytes consumed.
    pub fn decode(self, bytes: &[u8], offset: usize) -> Result<(Value, usize), CodecError> {
        match self {
            Codec::VarInt => varint::decode_u64(bytes, offset).map(|(v, n)| (Value(v), n)),
            Codec::Utf8 => decode_utf8(bytes, offset),
        }
    }

    fn to_char(self, value: Value) -> Result<char, CodecError> {
        value.as_char().ok_or(CodecError::Unrepresentable {
            value: value.get(),
            codec: self.name(),
        })
    }
}

fn decode_utf8(bytes: &[u8], offset: usize) -> Result<(Value, usize), CodecError> {
    let lead = *bytes.get(offset).ok_or(CodecError::Truncated { offset })?;
    let width = match lead {
        0x00..=0x7f => 1,
        0xc0..=0xdf => 2,
        0xe0..=0xef => 3,
        0xf0..=0xf7 => 4,
        _ => return Err(CodecError::Invalid { offset }),
    };
    let chunk = bytes
        .get(offset..offset + width)
        .ok_or(CodecError::Truncated { offset })?;
    let text = std::str::from_utf8(chunk).map_err(|_| CodecError::Invalid { offset })?;
    let ch = text.chars().next().ok_or(CodecError::Invalid { offset })?;
    Ok((Value::from(ch), width))
}
