// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt; // for oneshot

use certwatch_kernel::api::ApiCanister;
use certwatch_kernel::error::FetchError;
use certwatch_kernel::fixtures::{self, TestKey, FIXED_TIME_NS};
use certwatch_kernel::integrity::{IntegrityChecker, StateReader};
use certwatch_kernel::tree::Path;
use certwatch_kernel::types::principal::Principal;
use certwatch_kernel::verify::CertificateVerifier;
use certwatch_node::auditor::Auditor;
use certwatch_node::network::RecordSource;
use certwatch_node::server::{build_router, AppState};

struct OneCertificate(Vec<u8>);

#[async_trait]
impl StateReader for OneCertificate {
    async fn read_state(&self, _: &Principal, _: &[Path]) -> Result<Vec<u8>, FetchError> {
        Ok(self.0.clone())
    }
}

struct EmptyApi;

#[async_trait]
impl RecordSource for EmptyApi {
    async fn canister(&self, canister_id: &Principal) -> Result<ApiCanister, FetchError> {
        Ok(ApiCanister {
            id: canister_id.to_text(),
            ..Default::default()
        })
    }
}

fn state() -> AppState<OneCertificate, EmptyApi> {
    let root = TestKey::from_seed(1);
    let cert = root.certify(fixtures::canister_tree(
        &fixtures::canister_id(3),
        fixtures::sequential_hash(),
        &fixtures::user_principal(4),
        FIXED_TIME_NS,
    ));
    let checker = IntegrityChecker::new(
        OneCertificate(cert.to_cbor()),
        CertificateVerifier::new(root.public_key()),
    );
    AppState::new(Auditor::new(checker, EmptyApi, 2))
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_audit_then_read_report() {
    let state = state();
    let canister = fixtures::canister_id(3).to_text();

    let req = Request::builder()
        .method("POST")
        .uri(format!("/v1/audit/{}", canister))
        .body(Body::empty())
        .unwrap();
    let response = build_router(state.clone(), None).oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let summary = body_json(response).await;
    assert_eq!(summary["status"], "discrepancy");

    let req = Request::builder()
        .uri(format!("/v1/reports/{}", canister))
        .body(Body::empty())
        .unwrap();
    let response = build_router(state.clone(), None).oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, summary);

    let req = Request::builder().uri("/v1/reports").body(Body::empty()).unwrap();
    let response = build_router(state, None).oneshot(req).await.unwrap();
    let all = body_json(response).await;
    assert_eq!(all.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_unknown_and_invalid_ids() {
    let req = Request::builder()
        .uri(format!("/v1/reports/{}", fixtures::canister_id(8).to_text()))
        .body(Body::empty())
        .unwrap();
    let response = build_router(state(), None).oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let req = Request::builder()
        .method("POST")
        .uri("/v1/audit/not-a-principal")
        .body(Body::empty())
        .unwrap();
    let response = build_router(state(), None).oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_auth_token_required() {
    let app = build_router(state(), Some("secret".into()));

    let req = Request::builder().uri("/v1/reports").body(Body::empty()).unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let req = Request::builder()
        .uri("/v1/reports")
        .header("Authorization", "Bearer secret")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
