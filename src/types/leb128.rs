// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Unsigned LEB128, used by the certified `/time` leaf.

use crate::error::DecodeError;

pub fn decode_u64(bytes: &[u8]) -> Result<u64, DecodeError> {
    let mut result: u64 = 0;
    let mut shift = 0u32;
    for (i, byte) in bytes.iter().enumerate() {
        let low = (byte & 0x7f) as u64;
        if shift >= 64 || (shift == 63 && low > 1) {
            return Err(DecodeError::Leb128);
        }
        result |= low << shift;
        if byte & 0x80 == 0 {
            // Trailing bytes after the terminator are not a number.
            return if i + 1 == bytes.len() { Ok(result) } else { Err(DecodeError::Leb128) };
        }
        shift += 7;
    }
    Err(DecodeError::Leb128)
}

pub fn encode_u64(mut value: u64) -> Vec<u8> {
    let mut out = Vec::new();
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            return out;
        }
        out.push(byte | 0x80);
    }
}
