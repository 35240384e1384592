// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Principal identifiers.
//!
//! Textual form: `base32(crc32_be(bytes) ++ bytes)`, lower case, no padding,
//! grouped in chunks of five characters joined by `-`.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::config::MAX_PRINCIPAL_LEN;
use crate::error::PrincipalError;

const ALPHABET: &[u8; 32] = b"abcdefghijklmnopqrstuvwxyz234567";

/// A canister, subnet or user identifier.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Principal(Vec<u8>);

impl Principal {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, PrincipalError> {
        if bytes.len() > MAX_PRINCIPAL_LEN {
            return Err(PrincipalError::TooLong(bytes.len()));
        }
        Ok(Self(bytes.to_vec()))
    }

    /// The anonymous caller, used as `sender` of unsigned `read_state` calls.
    pub fn anonymous() -> Self {
        Self(vec![0x04])
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    pub fn from_text(text: &str) -> Result<Self, PrincipalError> {
        let compact: String = text
            .chars()
            .filter(|c| *c != '-')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        let decoded = base32_decode(&compact)
            .ok_or_else(|| PrincipalError::InvalidText(text.to_string()))?;
        if decoded.len() < 4 {
            return Err(PrincipalError::InvalidText(text.to_string()));
        }

        let (checksum, bytes) = decoded.split_at(4);
        let principal = Self::from_slice(bytes)?;
        if checksum != crc32fast::hash(bytes).to_be_bytes() {
            return Err(PrincipalError::Checksum);
        }

        // Reject non-canonical spellings (wrong grouping, trailing bits).
        if principal.to_text() != text.to_ascii_lowercase() {
            return Err(PrincipalError::InvalidText(text.to_string()));
        }
        Ok(principal)
    }

    pub fn to_text(&self) -> String {
        let mut raw = Vec::with_capacity(4 + self.0.len());
        raw.extend_from_slice(&crc32fast::hash(&self.0).to_be_bytes());
        raw.extend_from_slice(&self.0);

        let encoded = base32_encode(&raw);
        let mut out = String::with_capacity(encoded.len() + encoded.len() / 5);
        for (i, c) in encoded.chars().enumerate() {
            if i > 0 && i % 5 == 0 {
                out.push('-');
            }
            out.push(c);
        }
        out
    }
}

fn base32_encode(input: &[u8]) -> String {
    let mut out = String::with_capacity((input.len() * 8 + 4) / 5);
    let mut buffer: u32 = 0;
    let mut bits = 0;
    for &byte in input {
        buffer = (buffer << 8) | byte as u32;
        bits += 8;
        while bits >= 5 {
            bits -= 5;
            out.push(ALPHABET[((buffer >> bits) & 0x1f) as usize] as char);
        }
    }
    if bits > 0 {
        out.push(ALPHABET[((buffer << (5 - bits)) & 0x1f) as usize] as char);
    }
    out
}

fn base32_decode(input: &str) -> Option<Vec<u8>> {
    let mut out = Vec::with_capacity(input.len() * 5 / 8);
    let mut buffer: u32 = 0;
    let mut bits = 0;
    for c in input.bytes() {
        let value = ALPHABET.iter().position(|a| *a == c)? as u32;
        buffer = (buffer << 5) | value;
        bits += 5;
        if bits >= 8 {
            bits -= 8;
            out.push((buffer >> bits) as u8);
        }
    }
    Some(out)
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl fmt::Debug for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Principal({})", self.to_text())
    }
}

impl FromStr for Principal {
    type Err = PrincipalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_text(s)
    }
}

impl TryFrom<&[u8]> for Principal {
    type Error = PrincipalError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Self::from_slice(bytes)
    }
}

impl AsRef<[u8]> for Principal {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Serialize for Principal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_text())
    }
}

impl<'de> Deserialize<'de> for Principal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Principal::from_text(&text).map_err(serde::de::Error::custom)
    }
}
