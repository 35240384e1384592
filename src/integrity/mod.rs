// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Integrity checking of API records against certified state.
//!
//! # Flow
//! 1. fetch certificate bytes for the watched paths (network collaborator)
//! 2. parse
//! 3. verify the signature chain
//! 4. for each watched field: lookup → decode → compare
//!
//! Parse and trust failures abort the check with a [`CheckError`].
//! Everything a single field can go wrong with is a report entry.

pub mod fields;
pub mod report;

use async_trait::async_trait;

use crate::api::ApiCanister;
use crate::certificate::Certificate;
use crate::error::{CheckError, FetchError};
use crate::tree::{LookupResult, Path};
use crate::types::principal::Principal;
use crate::verify::{CertificateVerifier, VerifiedCertificate};

pub use fields::{default_fields, FieldSource, FieldValue, WatchedField};
pub use report::{Discrepancy, DiscrepancyKind, DiscrepancyReport, MissingReason};

/// Fetches `read_state` certificates. Implemented by the network layer.
#[async_trait]
pub trait StateReader: Send + Sync {
    async fn read_state(&self, canister_id: &Principal, paths: &[Path]) -> Result<Vec<u8>, FetchError>;
}

#[async_trait]
impl<T: StateReader + ?Sized> StateReader for std::sync::Arc<T> {
    async fn read_state(&self, canister_id: &Principal, paths: &[Path]) -> Result<Vec<u8>, FetchError> {
        (**self).read_state(canister_id, paths).await
    }
}

/// Cross-checks API records against certified canister state.
pub struct IntegrityChecker<R> {
    reader: R,
    verifier: CertificateVerifier,
    fields: Vec<WatchedField>,
}

impl<R> IntegrityChecker<R> {
    pub fn new(reader: R, verifier: CertificateVerifier) -> Self {
        Self {
            reader,
            verifier,
            fields: default_fields(),
        }
    }

    pub fn with_fields(mut self, fields: Vec<WatchedField>) -> Self {
        self.fields = fields;
        self
    }

    pub fn fields(&self) -> &[WatchedField] {
        &self.fields
    }

    pub fn verifier(&self) -> &CertificateVerifier {
        &self.verifier
    }

    pub fn reader(&self) -> &R {
        &self.reader
    }

    /// Paths that must be requested from the network for `canister_id`.
    pub fn paths_for(&self, canister_id: &Principal) -> Vec<Path> {
        self.fields
            .iter()
            .filter_map(|field| field.path(canister_id))
            .collect()
    }

    /// Runs the check on certificate bytes that were already fetched.
    pub fn check_certificate(
        &self,
        canister_id: &Principal,
        certificate_bytes: &[u8],
        record: &ApiCanister,
    ) -> Result<DiscrepancyReport, CheckError> {
        let certificate = Certificate::from_cbor(certificate_bytes)?;
        let verified = self.verifier.verify_for_canister(certificate, canister_id)?;
        tracing::debug!(
            "Certificate for {} verified, root hash {}",
            canister_id,
            verified.root_hash()
        );
        Ok(self.check_verified(canister_id, &verified, record))
    }

    /// Compares every watched field. Never fails: per-field problems are entries.
    pub fn check_verified(
        &self,
        canister_id: &Principal,
        verified: &VerifiedCertificate,
        record: &ApiCanister,
    ) -> DiscrepancyReport {
        let mut report = DiscrepancyReport::new();

        for field in &self.fields {
            let api = (field.api_value)(record);

            let lookup = match field.source {
                FieldSource::Leaf(path_for) => verified.lookup(&path_for(canister_id)),
                FieldSource::DelegationSubnet => match verified.subnet_id() {
                    Some(subnet_id) => LookupResult::Found(subnet_id.as_slice()),
                    // Root-signed: no subnet is certified, so an API claim has no backing.
                    None if api.is_some() => LookupResult::Absent,
                    None => continue,
                },
            };

            let kind = match lookup {
                LookupResult::Found(bytes) => match (field.decode)(bytes) {
                    Ok(authenticated) => {
                        if api.as_ref() == Some(&authenticated) {
                            continue;
                        }
                        DiscrepancyKind::Mismatch {
                            authenticated: Some(authenticated),
                            api,
                        }
                    }
                    Err(e) => DiscrepancyKind::Undecodable {
                        reason: e.to_string(),
                        api,
                    },
                },
                LookupResult::Absent => DiscrepancyKind::MissingAuthenticatedValue {
                    reason: MissingReason::Absent,
                    api,
                },
                LookupResult::Unknown => DiscrepancyKind::MissingAuthenticatedValue {
                    reason: MissingReason::Unknown,
                    api,
                },
                LookupResult::Error => DiscrepancyKind::MissingAuthenticatedValue {
                    reason: MissingReason::Error,
                    api,
                },
            };

            tracing::warn!("{} {}: {:?}", canister_id, field.name, kind);
            report.push(field.name, kind);
        }

        report
    }
}

impl<R: StateReader> IntegrityChecker<R> {
    /// Fetches, verifies and compares. A mismatch is a report entry, not an error.
    pub async fn check(
        &self,
        canister_id: &Principal,
        record: &ApiCanister,
    ) -> Result<DiscrepancyReport, CheckError> {
        let paths = self.paths_for(canister_id);
        let bytes = self.reader.read_state(canister_id, &paths).await.map_err(|e| {
            tracing::warn!("read_state for {} failed: {}", canister_id, e);
            e
        })?;
        self.check_certificate(canister_id, &bytes, record)
    }
}
