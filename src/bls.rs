// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! BLS12-381 signature checks.
//!
//! Min-sig variant: 48-byte signatures in G1, 96-byte public keys in G2.
//! Keys travel DER-wrapped on the wire; both forms are accepted here.

use core::fmt;

use blst::min_sig::{PublicKey as BlstPublicKey, Signature as BlstSignature};
use blst::BLST_ERROR;

use crate::config::{BLS_DST, DER_KEY_LEN, DER_PREFIX, MAINNET_ROOT_KEY_DER_HEX, PUBLIC_KEY_LEN};
use crate::error::VerificationError;

/// A compressed G2 public key.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PublicKey([u8; PUBLIC_KEY_LEN]);

impl PublicKey {
    /// Accepts a raw 96-byte key or a 133-byte DER SubjectPublicKeyInfo.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, VerificationError> {
        let raw = match bytes.len() {
            PUBLIC_KEY_LEN => bytes,
            DER_KEY_LEN => {
                if bytes[..DER_PREFIX.len()] != DER_PREFIX {
                    return Err(VerificationError::InvalidPublicKey(
                        "unexpected DER prefix".into(),
                    ));
                }
                &bytes[DER_PREFIX.len()..]
            }
            other => {
                return Err(VerificationError::InvalidPublicKey(format!(
                    "length {} is neither {} (raw) nor {} (DER)",
                    other, PUBLIC_KEY_LEN, DER_KEY_LEN
                )))
            }
        };

        let mut key = [0u8; PUBLIC_KEY_LEN];
        key.copy_from_slice(raw);
        Ok(PublicKey(key))
    }

    pub fn from_hex(text: &str) -> Result<Self, VerificationError> {
        let bytes = hex::decode(text.trim())
            .map_err(|e| VerificationError::InvalidPublicKey(e.to_string()))?;
        Self::from_bytes(&bytes)
    }

    /// The network's published root key.
    pub fn mainnet() -> Result<Self, VerificationError> {
        Self::from_hex(MAINNET_ROOT_KEY_DER_HEX)
    }

    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_LEN] {
        &self.0
    }

    pub fn to_der(&self) -> Vec<u8> {
        let mut out = DER_PREFIX.to_vec();
        out.extend_from_slice(&self.0);
        out
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({}..)", hex::encode(&self.0[..8]))
    }
}

/// Checks `signature` over `message` under `key`.
///
/// Any decoding failure of key or signature counts as an invalid signature:
/// a point that is not on the curve cannot have signed anything.
pub fn verify_signature(
    key: &PublicKey,
    message: &[u8],
    signature: &[u8],
) -> Result<(), VerificationError> {
    let pk = BlstPublicKey::key_validate(key.as_bytes()).map_err(|e| {
        tracing::debug!("BLS public key rejected: {:?}", e);
        VerificationError::InvalidSignature
    })?;
    let sig = BlstSignature::sig_validate(signature, true).map_err(|e| {
        tracing::debug!("BLS signature rejected: {:?}", e);
        VerificationError::InvalidSignature
    })?;

    match sig.verify(false, message, BLS_DST, &[], &pk, false) {
        BLST_ERROR::BLST_SUCCESS => Ok(()),
        other => {
            tracing::debug!("BLS verification failed: {:?}", other);
            Err(VerificationError::InvalidSignature)
        }
    }
}
