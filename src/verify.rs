// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Certificate verification.
//!
//! # Chain of trust
//! ```text
//! root key ──signs──▶ delegation certificate
//!                       └─ /subnet/<id>/public_key ──signs──▶ certificate
//! ```
//! Without a delegation the root key signs the certificate directly.
//!
//! # Guarantee
//! A [`VerifiedCertificate`] only exists if every signature on the way to
//! the root key checked out. It is the only place leaves can be read from.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde_cbor::Value;

use crate::bls::{verify_signature, PublicKey};
use crate::certificate::Certificate;
use crate::config::{DEFAULT_MAX_CERT_AGE_SECS, DEFAULT_MAX_FUTURE_SKEW_SECS, MAX_DELEGATION_DEPTH};
use crate::error::{Result, VerificationError};
use crate::tree::{Digest, HashTree, LookupResult, Path, SubtreeLookup};
use crate::types::leb128;
use crate::types::principal::Principal;

pub fn time_path() -> Path {
    Path::from_iter(["time"])
}

pub fn subnet_path(subnet_id: &Principal) -> Path {
    Path::from_iter([b"subnet".as_slice(), subnet_id.as_slice()])
}

/// Allowed distance between the certified `/time` and the local clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub max_age: Duration,
    pub max_future_skew: Duration,
    /// Fixed "now" in nanoseconds since the epoch. `None` reads the system clock.
    pub now_ns: Option<u64>,
}

impl Default for TimeWindow {
    fn default() -> Self {
        Self {
            max_age: Duration::from_secs(DEFAULT_MAX_CERT_AGE_SECS),
            max_future_skew: Duration::from_secs(DEFAULT_MAX_FUTURE_SKEW_SECS),
            now_ns: None,
        }
    }
}

impl TimeWindow {
    pub fn at(mut self, now_ns: u64) -> Self {
        self.now_ns = Some(now_ns);
        self
    }

    fn bounds(&self) -> (u64, u64) {
        let now = self.now_ns.unwrap_or_else(system_now_ns);
        let not_before = now.saturating_sub(duration_ns(self.max_age));
        let not_after = now.saturating_add(duration_ns(self.max_future_skew));
        (not_before, not_after)
    }
}

/// Nanoseconds in `d`, saturating at `u64::MAX`.
fn duration_ns(d: Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}

fn system_now_ns() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(duration_ns)
        .unwrap_or(0)
}

/// Canister id ranges a subnet is allowed to certify, inclusive on both ends.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CanisterRanges(Vec<(Vec<u8>, Vec<u8>)>);

impl CanisterRanges {
    pub fn new(ranges: Vec<(Vec<u8>, Vec<u8>)>) -> Self {
        Self(ranges)
    }

    pub fn from_cbor(bytes: &[u8]) -> std::result::Result<Self, String> {
        let value: Value = serde_cbor::from_slice(bytes).map_err(|e| e.to_string())?;
        let items = match value {
            Value::Array(items) => items,
            _ => return Err("expected an array of ranges".into()),
        };

        let mut ranges = Vec::with_capacity(items.len());
        for item in items {
            match item {
                Value::Array(pair) => match pair.as_slice() {
                    [Value::Bytes(lo), Value::Bytes(hi)] => ranges.push((lo.clone(), hi.clone())),
                    _ => return Err("range must be a pair of byte strings".into()),
                },
                _ => return Err("range must be an array".into()),
            }
        }
        Ok(Self(ranges))
    }

    pub fn to_cbor(&self) -> Vec<u8> {
        let value = Value::Array(
            self.0
                .iter()
                .map(|(lo, hi)| Value::Array(vec![Value::Bytes(lo.clone()), Value::Bytes(hi.clone())]))
                .collect(),
        );
        serde_cbor::to_vec(&value).unwrap_or_default()
    }

    pub fn contains(&self, canister_id: &Principal) -> bool {
        let id = canister_id.as_slice();
        self.0
            .iter()
            .any(|(lo, hi)| lo.as_slice() <= id && id <= hi.as_slice())
    }
}

/// A certificate whose signature chain has been checked.
#[derive(Debug, Clone)]
pub struct VerifiedCertificate {
    certificate: Certificate,
    subnet_id: Option<Principal>,
    canister_ranges: Option<CanisterRanges>,
    time_ns: Option<u64>,
}

impl VerifiedCertificate {
    pub fn lookup(&self, path: &Path) -> LookupResult<'_> {
        self.certificate.tree().lookup(path)
    }

    pub fn lookup_subtree(&self, path: &Path) -> SubtreeLookup<'_> {
        self.certificate.tree().lookup_subtree(path)
    }

    pub fn tree(&self) -> &HashTree {
        self.certificate.tree()
    }

    pub fn root_hash(&self) -> Digest {
        self.certificate.root_hash()
    }

    /// Subnet that signed this certificate, if it was delegated.
    pub fn subnet_id(&self) -> Option<&Principal> {
        self.subnet_id.as_ref()
    }

    pub fn canister_ranges(&self) -> Option<&CanisterRanges> {
        self.canister_ranges.as_ref()
    }

    /// Certified time in nanoseconds since the epoch.
    pub fn time_ns(&self) -> Option<u64> {
        self.time_ns
    }

    pub fn certificate(&self) -> &Certificate {
        &self.certificate
    }
}

/// Checks certificates against a root key distributed out of band.
#[derive(Debug, Clone)]
pub struct CertificateVerifier {
    root_key: PublicKey,
    time_window: Option<TimeWindow>,
    max_delegation_depth: usize,
}

impl CertificateVerifier {
    pub fn new(root_key: PublicKey) -> Self {
        Self {
            root_key,
            time_window: None,
            max_delegation_depth: MAX_DELEGATION_DEPTH,
        }
    }

    pub fn with_time_window(mut self, window: TimeWindow) -> Self {
        self.time_window = Some(window);
        self
    }

    pub fn with_max_delegation_depth(mut self, depth: usize) -> Self {
        self.max_delegation_depth = depth;
        self
    }

    pub fn root_key(&self) -> &PublicKey {
        &self.root_key
    }

    /// Verifies the full chain and, when given, that the certificate was
    /// signed by `expected_subnet`.
    pub fn verify(
        &self,
        certificate: Certificate,
        expected_subnet: Option<&Principal>,
    ) -> Result<VerifiedCertificate> {
        let verified = self.verify_chain(certificate, 0)?;

        if let Some(expected) = expected_subnet {
            if verified.subnet_id.as_ref() != Some(expected) {
                tracing::warn!(
                    "Certificate subnet {:?} does not match expected {}",
                    verified.subnet_id,
                    expected
                );
                return Err(VerificationError::UnknownSubnet {
                    expected: expected.clone(),
                    actual: verified.subnet_id.clone(),
                });
            }
        }

        if let Some(window) = &self.time_window {
            check_time(&verified, window)?;
        }

        Ok(verified)
    }

    /// Like [`verify`](Self::verify), and additionally requires a delegated
    /// subnet to be authorized for `canister_id`.
    pub fn verify_for_canister(
        &self,
        certificate: Certificate,
        canister_id: &Principal,
    ) -> Result<VerifiedCertificate> {
        let verified = self.verify(certificate, None)?;

        if let Some(subnet_id) = &verified.subnet_id {
            let in_range = verified
                .canister_ranges
                .as_ref()
                .map(|ranges| ranges.contains(canister_id))
                .unwrap_or(false);
            if !in_range {
                tracing::warn!(
                    "Canister {} is not in the ranges of subnet {}",
                    canister_id,
                    subnet_id
                );
                return Err(VerificationError::CanisterOutOfRange {
                    canister_id: canister_id.clone(),
                    subnet_id: subnet_id.clone(),
                });
            }
        }

        Ok(verified)
    }

    fn verify_chain(&self, certificate: Certificate, depth: usize) -> Result<VerifiedCertificate> {
        // 1. Resolve the key that must have signed this certificate.
        let (key, subnet_id, canister_ranges) = match certificate.delegation() {
            None => (self.root_key, None, None),
            Some(delegation) => {
                if depth >= self.max_delegation_depth {
                    return Err(VerificationError::DelegationTooDeep(self.max_delegation_depth));
                }

                // The delegation itself must chain back to the same root key.
                let nested = self.verify_chain(delegation.parse_certificate()?, depth + 1)?;
                let subnet = subnet_path(&delegation.subnet_id);

                let key_bytes = nested
                    .lookup(&subnet.join("public_key"))
                    .found()
                    .ok_or_else(|| VerificationError::MissingDelegationKey(delegation.subnet_id.clone()))?;
                let key = PublicKey::from_bytes(key_bytes)?;

                let ranges_path = subnet.join("canister_ranges");
                let ranges = match nested.lookup(&ranges_path) {
                    LookupResult::Found(bytes) => Some(CanisterRanges::from_cbor(bytes).map_err(
                        |reason| VerificationError::MalformedMetadata {
                            path: ranges_path.to_string(),
                            reason,
                        },
                    )?),
                    _ => None,
                };

                tracing::debug!("Delegation to subnet {} verified", delegation.subnet_id);
                (key, Some(delegation.subnet_id.clone()), ranges)
            }
        };

        // 2. Check the signature over the domain-separated root hash.
        verify_signature(&key, &certificate.signed_message(), certificate.signature())?;

        // 3. Extract the certified time, if present.
        let time_ns = match certificate.tree().lookup(&time_path()) {
            LookupResult::Found(bytes) => {
                Some(leb128::decode_u64(bytes).map_err(|e| VerificationError::MalformedMetadata {
                    path: time_path().to_string(),
                    reason: e.to_string(),
                })?)
            }
            _ => None,
        };

        Ok(VerifiedCertificate {
            certificate,
            subnet_id,
            canister_ranges,
            time_ns,
        })
    }
}

fn check_time(verified: &VerifiedCertificate, window: &TimeWindow) -> Result<()> {
    let time_ns = verified.time_ns.ok_or(VerificationError::MissingTime)?;
    let (not_before_ns, not_after_ns) = window.bounds();
    if time_ns < not_before_ns || time_ns > not_after_ns {
        tracing::warn!(
            "Certificate time {} outside window [{}, {}]",
            time_ns,
            not_before_ns,
            not_after_ns
        );
        return Err(VerificationError::ExpiredOrFutureCertificate {
            time_ns,
            not_before_ns,
            not_after_ns,
        });
    }
    Ok(())
}
