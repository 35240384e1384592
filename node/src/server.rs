// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::{Path, Request as AxumRequest, State};
use axum::http::header::AUTHORIZATION;
use axum::http::StatusCode;
use axum::middleware::{from_fn_with_state, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Json, Router};
use tokio::sync::RwLock;

use certwatch_kernel::integrity::StateReader;
use certwatch_kernel::types::principal::Principal;

use crate::auditor::{AuditOutcome, AuditSummary, Auditor};
use crate::errors::NodeError;
use crate::network::RecordSource;

/// Latest summary per canister.
pub type SharedReports = Arc<RwLock<BTreeMap<Principal, AuditSummary>>>;

pub struct AppState<R, A> {
    pub auditor: Arc<Auditor<R, A>>,
    pub reports: SharedReports,
}

impl<R, A> Clone for AppState<R, A> {
    fn clone(&self) -> Self {
        Self {
            auditor: self.auditor.clone(),
            reports: self.reports.clone(),
        }
    }
}

impl<R, A> AppState<R, A> {
    pub fn new(auditor: Auditor<R, A>) -> Self {
        Self {
            auditor: Arc::new(auditor),
            reports: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }
}

/// Stores the summaries of a finished round.
pub async fn record_outcomes(reports: &SharedReports, outcomes: &[AuditOutcome]) {
    let mut latest = reports.write().await;
    for outcome in outcomes {
        latest.insert(outcome.canister_id.clone(), outcome.summary());
    }
}

async fn auth_guard(
    State(token): State<Arc<String>>,
    req: AxumRequest,
    next: Next,
) -> Result<Response, StatusCode> {
    let provided = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|val| val.to_str().ok())
        .and_then(|val| val.strip_prefix("Bearer "));

    match provided {
        Some(provided) if provided == token.as_str() => Ok(next.run(req).await),
        _ => Err(StatusCode::UNAUTHORIZED),
    }
}

pub fn build_router<R, A>(state: AppState<R, A>, auth_token: Option<String>) -> Router
where
    R: StateReader + 'static,
    A: RecordSource + 'static,
{
    let mut app = Router::new()
        .route("/v1/reports", get(list_reports::<R, A>))
        .route("/v1/reports/:canister_id", get(get_report::<R, A>))
        .route("/v1/audit/:canister_id", post(audit_now::<R, A>))
        .with_state(state);

    if let Some(token) = auth_token {
        tracing::info!("Auth Enabled: Bearer token required");
        app = app.layer(from_fn_with_state(Arc::new(token), auth_guard));
    } else {
        tracing::warn!("Auth Disabled: No token configured");
    }

    // Probes stay reachable without a token.
    app.route("/health", get(health))
        .route("/metrics", get(metrics_handler))
}

async fn list_reports<R, A>(State(state): State<AppState<R, A>>) -> Json<Vec<AuditSummary>> {
    let latest = state.reports.read().await;
    Json(latest.values().cloned().collect())
}

async fn get_report<R, A>(
    State(state): State<AppState<R, A>>,
    Path(canister_id): Path<String>,
) -> Result<Json<AuditSummary>, (StatusCode, String)> {
    let canister_id =
        Principal::from_text(&canister_id).map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
    let latest = state.reports.read().await;
    latest
        .get(&canister_id)
        .cloned()
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, format!("{} has not been audited", canister_id)))
}

async fn audit_now<R, A>(
    State(state): State<AppState<R, A>>,
    Path(canister_id): Path<String>,
) -> Result<Json<AuditSummary>, NodeError>
where
    R: StateReader,
    A: RecordSource,
{
    let canister_id = Principal::from_text(&canister_id)?;
    let outcome = state.auditor.audit(&canister_id).await;
    record_outcomes(&state.reports, std::slice::from_ref(&outcome)).await;
    Ok(Json(outcome.summary()))
}

async fn health() -> &'static str {
    "ok"
}

async fn metrics_handler() -> String {
    crate::telemetry::get_metrics()
}
