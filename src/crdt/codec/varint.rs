//! Unsigned LEB128 variable-length integers.
//!
//! Each byte carries seven payload bits, least significant group first. The
//! high bit is set on every byte except the last.

use crate::crdt::error::CodecError;

/// Longest encoding of a `u64`.
pub const MAX_LEN: usize = 10;

const CONTINUATION: u8 = 0x80;
const PAYLOAD: u8 = 0x7f;

/// Number of bytes `value` occupies once encoded.
pub fn len_u64(value: u64) -> usize {
    let bits = 64 - value.leading_zeros() as usize;
    bits.div_ceil(7).max(1)
}

/// Appends the encoding of `value` to `out`, returning the bytes written.
pub fn encode_u64(mut value: u64, out: &mut Vec<u8>) -> usize {
    let start = out.len();
    while value >= u64::from(CONTINUATION) {
        out.push((value as u8 & PAYLOAD) | CONTINUATION);
        value >>= 7;
    }
    out.push(value as u8);
    out.len() - start
}

/// Decodes a value starting at `offset`, returning it with the bytes consumed.
pub fn decode_u64(bytes: &[u8], offset: usize) -> Result<(u64, usize), CodecError> {
    let mut value = 0u64;
    for (i, &byte) in bytes.get(offset..).unwrap_or_default().iter().enumerate() {
        if i == MAX_LEN {
            return Err(CodecError::Overflow { offset });
        }
        let group = u64::from(byte & PAYLOAD);
        let shift = 7 * i as u32;
        // The tenth byte may only contribute the single remaining bit.
        if i == MAX_LEN - 1 && group > 1 {
            return Err(CodecError::Overflow { offset });
        }
        value |= group << shift;
        if byte & CONTINUATION == 0 {
            return Ok((value, i + 1));
        }
    }
    Err(CodecError::Truncated { offset })
}
