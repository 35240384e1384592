// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use std::time::Duration;

use tokio::net::TcpListener;

use certwatch_kernel::integrity::IntegrityChecker;
use certwatch_node::auditor::Auditor;
use certwatch_node::config::AuditConfig;
use certwatch_node::errors::NodeError;
use certwatch_node::network::{IndexApiClient, ReplicaClient};
use certwatch_node::server::{build_router, record_outcomes, AppState};
use certwatch_node::telemetry::init_telemetry;

#[tokio::main]
async fn main() -> Result<(), NodeError> {
    init_telemetry();

    let cfg = AuditConfig::from_env()?;
    tracing::info!(
        "Starting certwatch node: host {}, API {}, {} canisters",
        cfg.ic_host,
        cfg.api_url,
        cfg.canisters.len()
    );

    let replica = ReplicaClient::new(&cfg.ic_host, cfg.timeout, cfg.ingress_expiry)?;
    let api = IndexApiClient::new(&cfg.api_url, cfg.timeout)?;
    let checker = IntegrityChecker::new(replica, cfg.verifier()?);
    let state = AppState::new(Auditor::new(checker, api, cfg.max_concurrency));

    if !cfg.canisters.is_empty() {
        let auditor = state.auditor.clone();
        let reports = state.reports.clone();
        let canisters = cfg.canisters.clone();
        let interval_secs = cfg.interval_secs;
        tokio::spawn(async move {
            loop {
                tracing::debug!("Audit round over {} canisters", canisters.len());
                let outcomes = auditor.audit_many(&canisters).await;
                record_outcomes(&reports, &outcomes).await;

                match interval_secs {
                    Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
                    None => break,
                }
            }
        });
    }

    let app = build_router(state, cfg.auth_token.clone());
    tracing::info!("Listening on {}", cfg.bind_addr);
    let listener = TcpListener::bind(cfg.bind_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
