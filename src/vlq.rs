//! Variable-length quantities
//!
//! MIDI stores delta-times and meta/sysex lengths as big-endian groups of
//! 7 bits. Every byte except the last has its high bit set.

use crate::error::{Result, SmfError};

const CONTINUATION: u8 = 0x80;
const GROUP_MASK: u64 = 0x7F;

/// Longest encoding of a `u64` (64 bits / 7 bits per byte, rounded up)
const MAX_VLQ_LEN: usize = 10;

/// Encode `value` as a variable-length quantity
///
/// At least one byte is produced, so `0` encodes as `[0x00]`.
pub fn encode(value: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(4);
    write_vlq(value, &mut out);
    out
}

/// Append the variable-length encoding of `value` to `buffer`
pub fn write_vlq(value: u64, buffer: &mut Vec<u8>) {
    let mut groups = [0u8; MAX_VLQ_LEN];
    let mut i = MAX_VLQ_LEN - 1;
    let mut rest = value;

    groups[i] = (rest & GROUP_MASK) as u8;
    rest >>= 7;
    while rest > 0 {
        i -= 1;
        groups[i] = (rest & GROUP_MASK) as u8 | CONTINUATION;
        rest >>= 7;
    }

    buffer.extend_from_slice(&groups[i..]);
}

/// Decode a variable-length quantity from the front of `bytes`
///
/// Returns the value and the number of bytes consumed.
pub fn decode(bytes: &[u8]) -> Result<(u64, usize)> {
    let mut value = 0u64;
    for (i, &byte) in bytes.iter().enumerate().take(MAX_VLQ_LEN) {
        value = (value << 7) | u64::from(byte & 0x7F);
        if byte & CONTINUATION == 0 {
            return Ok((value, i + 1));
        }
    }
    Err(SmfError::MalformedVlq)
}
