// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Bounded-concurrency audits.
//!
//! One audit = fetch the API record, fetch and verify the certificate,
//! compare. Checks for different canisters share nothing, so they run in
//! parallel up to `max_concurrency`.

use std::time::Instant;

use futures::stream::{self, StreamExt};
use serde::Serialize;

use certwatch_kernel::error::CheckError;
use certwatch_kernel::integrity::{DiscrepancyReport, IntegrityChecker, StateReader};
use certwatch_kernel::types::principal::Principal;

use crate::network::RecordSource;
use crate::telemetry::{CHECKS_TOTAL, CHECK_DURATION, DISCREPANCIES_TOTAL};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditOutcome {
    pub canister_id: Principal,
    pub result: Result<DiscrepancyReport, CheckError>,
}

impl AuditOutcome {
    /// Label used for the `outcome` metric and the summary status.
    pub fn label(&self) -> &'static str {
        match &self.result {
            Ok(report) if report.is_clean() => "clean",
            Ok(_) => "discrepancy",
            Err(CheckError::Fetch(_)) => "fetch_error",
            Err(CheckError::Certificate(_)) => "malformed",
            Err(CheckError::Verification(_)) => "untrusted",
        }
    }

    pub fn summary(&self) -> AuditSummary {
        let (report, error, retryable, fingerprint) = match &self.result {
            Ok(report) => (
                Some(report.clone()),
                None,
                false,
                (!report.is_clean()).then(|| hex::encode(report.fingerprint(&self.canister_id))),
            ),
            Err(e) => (None, Some(e.to_string()), e.is_retryable(), None),
        };
        AuditSummary {
            canister_id: self.canister_id.clone(),
            status: self.label(),
            report,
            error,
            retryable,
            fingerprint,
        }
    }
}

/// JSON view of an outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditSummary {
    pub canister_id: Principal,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<DiscrepancyReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub retryable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
}

pub struct Auditor<R, A> {
    checker: IntegrityChecker<R>,
    records: A,
    max_concurrency: usize,
}

impl<R: StateReader, A: RecordSource> Auditor<R, A> {
    pub fn new(checker: IntegrityChecker<R>, records: A, max_concurrency: usize) -> Self {
        Self {
            checker,
            records,
            max_concurrency: max_concurrency.max(1),
        }
    }

    pub fn checker(&self) -> &IntegrityChecker<R> {
        &self.checker
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Audits one canister. Never retries.
    pub async fn audit(&self, canister_id: &Principal) -> AuditOutcome {
        let start = Instant::now();
        let result = self.run(canister_id).await;
        let outcome = AuditOutcome {
            canister_id: canister_id.clone(),
            result,
        };

        metrics::histogram!(CHECK_DURATION, start.elapsed().as_secs_f64());
        metrics::counter!(CHECKS_TOTAL, 1, "outcome" => outcome.label());
        match &outcome.result {
            Ok(report) if report.is_clean() => {
                tracing::info!("{}: API agrees with certified state", canister_id);
            }
            Ok(report) => {
                for entry in report {
                    metrics::counter!(DISCREPANCIES_TOTAL, 1, "field" => entry.field.clone());
                }
                tracing::warn!(
                    "{}: {} discrepancies ({})",
                    canister_id,
                    report.len(),
                    report.fields().join(", ")
                );
            }
            Err(e) if e.is_trust_failure() => {
                tracing::error!("{}: certificate not trusted: {}", canister_id, e);
            }
            Err(e) => {
                tracing::warn!("{}: check inconclusive: {}", canister_id, e);
            }
        }

        outcome
    }

    async fn run(&self, canister_id: &Principal) -> Result<DiscrepancyReport, CheckError> {
        let record = self.records.canister(canister_id).await?;
        self.checker.check(canister_id, &record).await
    }

    /// Audits every canister, at most `max_concurrency` at once.
    /// Outcomes come back in input order.
    pub async fn audit_many(&self, canister_ids: &[Principal]) -> Vec<AuditOutcome> {
        // Owned ids: borrowed ones make the future unspawnable.
        let mut indexed: Vec<(usize, AuditOutcome)> =
            stream::iter(canister_ids.iter().cloned().enumerate())
                .map(|(i, id)| async move { (i, self.audit(&id).await) })
                .buffer_unordered(self.max_concurrency)
                .collect()
                .await;
        indexed.sort_by_key(|(i, _)| *i);
        indexed.into_iter().map(|(_, outcome)| outcome).collect()
    }
}
