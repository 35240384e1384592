// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Certificate envelope.
//!
//! ```text
//! certificate = {
//!   tree: hash-tree
//!   signature: bytes            ; 48-byte compressed G1 point
//!   ? delegation: {
//!     subnet_id: bytes
//!     certificate: bytes        ; nested certificate, same encoding
//!   }
//! }
//! ```
//!
//! Parsing never trusts anything. Only [`crate::verify::CertificateVerifier`]
//! turns a `Certificate` into something callers may read leaves from.

use std::collections::BTreeMap;

use serde_cbor::Value;

use crate::config::{CBOR_SELF_DESCRIBE, DOMAIN_STATE_ROOT, SIGNATURE_LEN};
use crate::error::CertificateError;
use crate::tree::hash::domain_sep;
use crate::tree::{Digest, HashTree};
use crate::types::principal::Principal;

/// A subnet's authorization to sign for its own state, certified by the root key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delegation {
    pub subnet_id: Principal,
    /// Encoded nested certificate. Parsed on demand by the verifier.
    pub certificate: Vec<u8>,
}

impl Delegation {
    pub fn parse_certificate(&self) -> Result<Certificate, CertificateError> {
        Certificate::from_cbor(&self.certificate)
    }
}

/// A parsed, not yet verified certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    tree: HashTree,
    signature: [u8; SIGNATURE_LEN],
    delegation: Option<Delegation>,
}

impl Certificate {
    pub fn new(tree: HashTree, signature: [u8; SIGNATURE_LEN], delegation: Option<Delegation>) -> Self {
        Self {
            tree,
            signature,
            delegation,
        }
    }

    pub fn from_cbor(bytes: &[u8]) -> Result<Self, CertificateError> {
        let value: Value =
            serde_cbor::from_slice(bytes).map_err(|e| CertificateError::Cbor(e.to_string()))?;
        Self::try_from(&value)
    }

    pub fn tree(&self) -> &HashTree {
        &self.tree
    }

    pub fn signature(&self) -> &[u8; SIGNATURE_LEN] {
        &self.signature
    }

    pub fn delegation(&self) -> Option<&Delegation> {
        self.delegation.as_ref()
    }

    pub fn root_hash(&self) -> Digest {
        self.tree.digest()
    }

    /// The exact bytes covered by the BLS signature.
    pub fn signed_message(&self) -> Vec<u8> {
        signed_message_for(&self.root_hash())
    }

    pub fn into_tree(self) -> HashTree {
        self.tree
    }

    pub fn to_value(&self) -> Value {
        let mut map = BTreeMap::new();
        map.insert(Value::Text("tree".into()), self.tree.to_value());
        map.insert(
            Value::Text("signature".into()),
            Value::Bytes(self.signature.to_vec()),
        );
        if let Some(delegation) = &self.delegation {
            let mut inner = BTreeMap::new();
            inner.insert(
                Value::Text("subnet_id".into()),
                Value::Bytes(delegation.subnet_id.as_slice().to_vec()),
            );
            inner.insert(
                Value::Text("certificate".into()),
                Value::Bytes(delegation.certificate.clone()),
            );
            map.insert(Value::Text("delegation".into()), Value::Map(inner));
        }
        Value::Map(map)
    }

    /// Encodes with the CBOR self-describe tag, as replicas do.
    pub fn to_cbor(&self) -> Vec<u8> {
        let mut out = CBOR_SELF_DESCRIBE.to_vec();
        out.extend(serde_cbor::to_vec(&self.to_value()).unwrap_or_default());
        out
    }
}

pub fn signed_message_for(root_hash: &Digest) -> Vec<u8> {
    let mut message = domain_sep(DOMAIN_STATE_ROOT);
    message.extend_from_slice(root_hash.as_bytes());
    message
}

impl TryFrom<&Value> for Certificate {
    type Error = CertificateError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        let map = match value {
            Value::Map(map) => map,
            Value::Tag(_, inner) => return Certificate::try_from(inner.as_ref()),
            _ => return Err(CertificateError::NotAMap),
        };

        let tree_value = field(map, "tree").ok_or(CertificateError::MissingField("tree"))?;
        let tree = HashTree::try_from(tree_value)?;

        let signature = match field(map, "signature") {
            Some(Value::Bytes(bytes)) => bytes,
            Some(_) => return Err(CertificateError::WrongType("signature")),
            None => return Err(CertificateError::MissingField("signature")),
        };
        let signature: [u8; SIGNATURE_LEN] = signature
            .as_slice()
            .try_into()
            .map_err(|_| CertificateError::SignatureLength(signature.len()))?;

        let delegation = match field(map, "delegation") {
            None | Some(Value::Null) => None,
            Some(Value::Map(inner)) => Some(parse_delegation(inner)?),
            Some(_) => return Err(CertificateError::WrongType("delegation")),
        };

        Ok(Certificate {
            tree,
            signature,
            delegation,
        })
    }
}

fn parse_delegation(map: &BTreeMap<Value, Value>) -> Result<Delegation, CertificateError> {
    let subnet_id = match field(map, "subnet_id") {
        Some(Value::Bytes(bytes)) => Principal::from_slice(bytes)?,
        Some(_) => return Err(CertificateError::WrongType("subnet_id")),
        None => return Err(CertificateError::MissingField("subnet_id")),
    };
    let certificate = match field(map, "certificate") {
        Some(Value::Bytes(bytes)) => bytes.clone(),
        Some(_) => return Err(CertificateError::WrongType("certificate")),
        None => return Err(CertificateError::MissingField("certificate")),
    };
    Ok(Delegation {
        subnet_id,
        certificate,
    })
}

fn field<'a>(map: &'a BTreeMap<Value, Value>, name: &str) -> Option<&'a Value> {
    map.get(&Value::Text(name.to_string()))
}
