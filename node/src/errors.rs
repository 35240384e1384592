// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use certwatch_kernel::error::{CheckError, FetchError, PrincipalError, VerificationError};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NodeError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Invalid root key: {0}")]
    RootKey(#[from] VerificationError),
    #[error("HTTP client error: {0}")]
    Http(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Check failed: {0}")]
    Check(#[from] CheckError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for NodeError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            NodeError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            NodeError::Check(CheckError::Fetch(FetchError::Timeout)) => {
                (StatusCode::GATEWAY_TIMEOUT, self.to_string())
            }
            NodeError::Check(CheckError::Fetch(_)) => (StatusCode::BAD_GATEWAY, self.to_string()),
            NodeError::Check(_) => (StatusCode::UNPROCESSABLE_ENTITY, self.to_string()),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string()),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

impl From<PrincipalError> for NodeError {
    fn from(e: PrincipalError) -> Self {
        NodeError::InvalidInput(e.to_string())
    }
}
