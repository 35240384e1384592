// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Command implementations for `certwatch-verify`.

use std::fs;
use std::path::Path as FsPath;

use anyhow::{Context, Result};
use serde::Serialize;

use certwatch_kernel::api::ApiCanister;
use certwatch_kernel::bls::PublicKey;
use certwatch_kernel::certificate::Certificate;
use certwatch_kernel::integrity::{DiscrepancyReport, IntegrityChecker};
use certwatch_kernel::types::principal::Principal;
use certwatch_kernel::verify::{CertificateVerifier, TimeWindow};
use certwatch_node::auditor::{AuditSummary, Auditor};
use certwatch_node::config::AuditConfig;
use certwatch_node::network::{IndexApiClient, ReplicaClient};

/// Trust settings shared by every command.
#[derive(Debug, Clone)]
pub struct TrustOptions {
    pub root_key_hex: String,
    pub ignore_time: bool,
    /// Fixed "now" for the freshness check, in nanoseconds.
    pub now_ns: Option<u64>,
}

impl TrustOptions {
    pub fn verifier(&self) -> Result<CertificateVerifier> {
        let key = PublicKey::from_hex(&self.root_key_hex).context("Failed to parse root key")?;
        let verifier = CertificateVerifier::new(key);
        if self.ignore_time {
            return Ok(verifier);
        }
        let window = match self.now_ns {
            Some(now) => TimeWindow::default().at(now),
            None => TimeWindow::default(),
        };
        Ok(verifier.with_time_window(window))
    }
}

/// Reads a certificate saved either as raw CBOR or as hex text.
pub fn read_certificate_file(path: &FsPath) -> Result<Vec<u8>> {
    let bytes = fs::read(path)
        .with_context(|| format!("Failed to read certificate file {}", path.display()))?;
    if let Ok(text) = std::str::from_utf8(&bytes) {
        if let Ok(decoded) = hex::decode(text.trim()) {
            return Ok(decoded);
        }
    }
    Ok(bytes)
}

pub fn read_record_file(path: &FsPath) -> Result<ApiCanister> {
    let bytes = fs::read(path)
        .with_context(|| format!("Failed to read API record {}", path.display()))?;
    serde_json::from_slice(&bytes).context("Failed to parse API record JSON")
}

/// Checks a saved certificate against a saved API record.
pub fn run_offline(
    canister_id: &Principal,
    certificate: &[u8],
    record: &ApiCanister,
    trust: &TrustOptions,
) -> Result<DiscrepancyReport> {
    let checker = IntegrityChecker::new((), trust.verifier()?);
    let report = checker
        .check_certificate(canister_id, certificate, record)
        .with_context(|| format!("Check of {} failed", canister_id))?;
    Ok(report)
}

/// Command-line overrides for the `check` command. Unset flags keep the
/// environment configuration.
#[derive(Debug, Clone, Default)]
pub struct CheckOverrides {
    pub host: Option<String>,
    pub api: Option<String>,
    pub root_key_hex: Option<String>,
    pub ignore_time: bool,
    pub now_ns: Option<u64>,
}

impl CheckOverrides {
    pub fn apply(self, cfg: &mut AuditConfig) {
        if let Some(host) = self.host {
            cfg.ic_host = host;
        }
        if let Some(api) = self.api {
            cfg.api_url = api;
        }
        if let Some(key) = self.root_key_hex {
            cfg.root_key_hex = key;
        }
        cfg.ignore_time |= self.ignore_time;
        if self.now_ns.is_some() {
            cfg.now_ns = self.now_ns;
        }
    }
}

/// Fetches both sides over the network and checks one canister.
pub async fn run_online(cfg: &AuditConfig, canister_id: &Principal) -> Result<AuditSummary> {
    let replica = ReplicaClient::new(&cfg.ic_host, cfg.timeout, cfg.ingress_expiry)?;
    let api = IndexApiClient::new(&cfg.api_url, cfg.timeout)?;
    let checker = IntegrityChecker::new(replica, cfg.verifier()?);
    let auditor = Auditor::new(checker, api, 1);
    Ok(auditor.audit(canister_id).await.summary())
}

#[derive(Debug, Serialize)]
pub struct LeafEntry {
    pub path: String,
    pub value: String,
}

#[derive(Debug, Serialize)]
pub struct CertificateDump {
    pub root_hash: String,
    pub delegated_by: Option<Principal>,
    /// `None` when verification was not requested.
    pub verified: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_error: Option<String>,
    pub time_ns: Option<u64>,
    pub leaves: Vec<LeafEntry>,
}

/// Lists every revealed leaf, optionally verifying the certificate first.
pub fn dump(certificate: &[u8], trust: Option<&TrustOptions>) -> Result<CertificateDump> {
    let certificate = Certificate::from_cbor(certificate).context("Failed to parse certificate")?;
    let leaves = certificate
        .tree()
        .list_paths()
        .into_iter()
        .map(|path| {
            let value = certificate
                .tree()
                .lookup(&path)
                .found()
                .map(hex::encode)
                .unwrap_or_default();
            LeafEntry {
                path: path.to_string(),
                value,
            }
        })
        .collect();

    let mut out = CertificateDump {
        root_hash: certificate.root_hash().to_string(),
        delegated_by: certificate.delegation().map(|d| d.subnet_id.clone()),
        verified: None,
        verification_error: None,
        time_ns: None,
        leaves,
    };

    if let Some(trust) = trust {
        match trust.verifier()?.verify(certificate, None) {
            Ok(verified) => {
                out.verified = Some(true);
                out.time_ns = verified.time_ns();
            }
            Err(e) => {
                out.verified = Some(false);
                out.verification_error = Some(e.to_string());
            }
        }
    }
    Ok(out)
}
