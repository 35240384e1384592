// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use certwatch_kernel::api::ApiCanister;
use certwatch_kernel::error::FetchError;
use certwatch_kernel::types::principal::Principal;

use super::agent::map_reqwest_error;
use crate::errors::NodeError;

/// Source of the untrusted records being audited.
#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn canister(&self, canister_id: &Principal) -> Result<ApiCanister, FetchError>;
}

#[derive(Debug, Clone)]
pub struct IndexApiClient {
    base_url: String,
    client: Client,
}

impl IndexApiClient {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, NodeError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NodeError::Http(e.to_string()))?;
        Ok(Self {
            base_url: url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl RecordSource for IndexApiClient {
    async fn canister(&self, canister_id: &Principal) -> Result<ApiCanister, FetchError> {
        let url = format!("{}/api/canisters/{}", self.base_url, canister_id.to_text());
        let resp = self.client.get(&url).send().await.map_err(map_reqwest_error)?;

        match resp.status() {
            status if status.is_success() => {}
            StatusCode::NOT_FOUND => {
                return Err(FetchError::Network(format!("API has no record of {}", canister_id)))
            }
            status => {
                return Err(FetchError::Network(format!("API request failed: {}", status)));
            }
        }

        resp.json().await.map_err(map_reqwest_error)
    }
}
