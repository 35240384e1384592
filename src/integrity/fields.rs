// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Watched fields.
//!
//! The fixed registry of values cross-checked between the certified state
//! and the indexing API. Each entry says where the authenticated value
//! lives, how to decode it, and how to read the API's claim.

use core::fmt;

use serde::{Serialize, Serializer};

use crate::api::ApiCanister;
use crate::error::DecodeError;
use crate::tree::Path;
use crate::types::principal::Principal;

/// A decoded value that can be compared across both sources.
#[derive(Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Raw digest bytes, shown as hex.
    Hash(Vec<u8>),
    Principal(Principal),
    /// An API value that did not parse as its semantic type.
    Unparsed(String),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Hash(bytes) => f.write_str(&hex::encode(bytes)),
            FieldValue::Principal(p) => write!(f, "{}", p),
            FieldValue::Unparsed(raw) => f.write_str(raw),
        }
    }
}

impl fmt::Debug for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Hash(_) => write!(f, "Hash({})", self),
            FieldValue::Principal(_) => write!(f, "Principal({})", self),
            FieldValue::Unparsed(_) => write!(f, "Unparsed({:?})", self.to_string()),
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Where the authenticated value comes from.
#[derive(Clone, Copy)]
pub enum FieldSource {
    /// A leaf of the certified tree; the path depends on the canister.
    Leaf(fn(&Principal) -> Path),
    /// The subnet id declared by the certificate's delegation.
    DelegationSubnet,
}

/// One value to cross-check.
#[derive(Clone, Copy)]
pub struct WatchedField {
    pub name: &'static str,
    pub source: FieldSource,
    pub decode: fn(&[u8]) -> Result<FieldValue, DecodeError>,
    pub api_value: fn(&ApiCanister) -> Option<FieldValue>,
}

impl fmt::Debug for WatchedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchedField").field("name", &self.name).finish()
    }
}

impl WatchedField {
    pub fn path(&self, canister_id: &Principal) -> Option<Path> {
        match self.source {
            FieldSource::Leaf(path_for) => Some(path_for(canister_id)),
            FieldSource::DelegationSubnet => None,
        }
    }
}

pub fn canister_path(canister_id: &Principal) -> Path {
    Path::from_iter([b"canister".as_slice(), canister_id.as_slice()])
}

pub fn module_hash_path(canister_id: &Principal) -> Path {
    canister_path(canister_id).join("module_hash")
}

pub fn controller_path(canister_id: &Principal) -> Path {
    canister_path(canister_id).join("controller")
}

pub fn decode_hash(bytes: &[u8]) -> Result<FieldValue, DecodeError> {
    if bytes.len() != 32 {
        return Err(DecodeError::Length {
            expected: 32,
            found: bytes.len(),
        });
    }
    Ok(FieldValue::Hash(bytes.to_vec()))
}

pub fn decode_principal(bytes: &[u8]) -> Result<FieldValue, DecodeError> {
    Ok(FieldValue::Principal(Principal::from_slice(bytes)?))
}

fn parse_hex(text: &str) -> FieldValue {
    match hex::decode(text.trim()) {
        Ok(bytes) => FieldValue::Hash(bytes),
        Err(_) => FieldValue::Unparsed(text.to_string()),
    }
}

fn parse_principal(text: &str) -> FieldValue {
    match Principal::from_text(text.trim()) {
        Ok(p) => FieldValue::Principal(p),
        Err(_) => FieldValue::Unparsed(text.to_string()),
    }
}

fn api_module_hash(record: &ApiCanister) -> Option<FieldValue> {
    record.module_hash().map(parse_hex)
}

fn api_controller(record: &ApiCanister) -> Option<FieldValue> {
    record.controller_id.as_deref().map(parse_principal)
}

fn api_subnet(record: &ApiCanister) -> Option<FieldValue> {
    record.subnet_id.as_deref().map(parse_principal)
}

pub const MODULE_HASH: WatchedField = WatchedField {
    name: "module_hash",
    source: FieldSource::Leaf(module_hash_path),
    decode: decode_hash,
    api_value: api_module_hash,
};

pub const CONTROLLER: WatchedField = WatchedField {
    name: "controller",
    source: FieldSource::Leaf(controller_path),
    decode: decode_principal,
    api_value: api_controller,
};

pub const SUBNET: WatchedField = WatchedField {
    name: "subnet",
    source: FieldSource::DelegationSubnet,
    decode: decode_principal,
    api_value: api_subnet,
};

pub fn default_fields() -> Vec<WatchedField> {
    vec![MODULE_HASH, CONTROLLER, SUBNET]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_hash_hex_is_case_insensitive() {
        let mut record = ApiCanister::default();
        record.module = Some(crate::api::ApiModule {
            id: Some("AB".repeat(32)),
            ..Default::default()
        });
        let api = (MODULE_HASH.api_value)(&record).unwrap();
        assert_eq!(api, FieldValue::Hash(vec![0xab; 32]));
        assert_eq!(decode_hash(&[0xab; 32]).unwrap(), api);
    }

    #[test]
    fn test_bad_api_values_are_kept_raw() {
        let mut record = ApiCanister::default();
        record.controller_id = Some("definitely-not-a-principal".into());
        let api = (CONTROLLER.api_value)(&record).unwrap();
        assert_eq!(api, FieldValue::Unparsed("definitely-not-a-principal".into()));
    }

    #[test]
    fn test_paths() {
        let id = Principal::from_slice(&[1, 2, 3]).unwrap();
        assert_eq!(
            module_hash_path(&id).to_string(),
            "/canister/0x010203/module_hash"
        );
        assert!(SUBNET.path(&id).is_none());
    }
}
