// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Replica `read_state` client.
//!
//! Sends an unsigned query from the anonymous principal. The certificate in
//! the response is returned as raw bytes; nothing here trusts it.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_bytes::{ByteBuf, Bytes};

use certwatch_kernel::config::CBOR_SELF_DESCRIBE;
use certwatch_kernel::error::FetchError;
use certwatch_kernel::integrity::StateReader;
use certwatch_kernel::tree::Path;
use certwatch_kernel::types::principal::Principal;

use crate::errors::NodeError;

#[derive(Serialize)]
struct Envelope<'a> {
    content: ReadStateContent<'a>,
}

#[derive(Serialize)]
struct ReadStateContent<'a> {
    request_type: &'static str,
    sender: &'a Bytes,
    paths: Vec<Vec<&'a Bytes>>,
    ingress_expiry: u64,
}

#[derive(Deserialize)]
struct ReadStateResponse {
    #[serde(default)]
    certificate: Option<ByteBuf>,
    #[serde(default)]
    reject_message: Option<String>,
}

/// Encodes a `read_state` request envelope, self-describe tag included.
pub fn encode_read_state(paths: &[Path], ingress_expiry_ns: u64) -> Result<Vec<u8>, FetchError> {
    let sender = Principal::anonymous();
    let envelope = Envelope {
        content: ReadStateContent {
            request_type: "read_state",
            sender: Bytes::new(sender.as_slice()),
            paths: paths
                .iter()
                .map(|path| path.labels().iter().map(|l| Bytes::new(l.as_bytes())).collect())
                .collect(),
            ingress_expiry: ingress_expiry_ns,
        },
    };

    let mut out = CBOR_SELF_DESCRIBE.to_vec();
    let body = serde_cbor::to_vec(&envelope)
        .map_err(|e| FetchError::Network(format!("request encoding failed: {}", e)))?;
    out.extend(body);
    Ok(out)
}

#[derive(Debug, Clone)]
pub struct ReplicaClient {
    base_url: String,
    client: Client,
    ingress_expiry: Duration,
}

impl ReplicaClient {
    pub fn new(host: &str, timeout: Duration, ingress_expiry: Duration) -> Result<Self, NodeError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NodeError::Http(e.to_string()))?;
        Ok(Self {
            base_url: host.trim_end_matches('/').to_string(),
            client,
            ingress_expiry,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn expiry_ns(&self) -> u64 {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        (now + self.ingress_expiry).as_nanos() as u64
    }
}

pub(crate) fn map_reqwest_error(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Network(e.to_string())
    }
}

#[async_trait]
impl StateReader for ReplicaClient {
    async fn read_state(&self, canister_id: &Principal, paths: &[Path]) -> Result<Vec<u8>, FetchError> {
        let url = format!(
            "{}/api/v2/canister/{}/read_state",
            self.base_url,
            canister_id.to_text()
        );
        let body = encode_read_state(paths, self.expiry_ns())?;
        tracing::debug!("read_state {} ({} paths)", canister_id, paths.len());

        let resp = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/cbor")
            .body(body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        if !resp.status().is_success() {
            return Err(FetchError::Network(format!(
                "read_state request failed: {}",
                resp.status()
            )));
        }

        let bytes = resp.bytes().await.map_err(map_reqwest_error)?;
        let parsed: ReadStateResponse = serde_cbor::from_slice(&bytes)
            .map_err(|e| FetchError::Network(format!("unreadable read_state response: {}", e)))?;

        match (parsed.certificate, parsed.reject_message) {
            (Some(certificate), _) => Ok(certificate.into_vec()),
            (None, Some(reason)) => Err(FetchError::Network(format!("read_state rejected: {}", reason))),
            (None, None) => Err(FetchError::Network("read_state response has no certificate".into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_cbor::Value;

    #[test]
    fn test_envelope_layout() {
        let canister = Principal::from_text("ryjl3-tyaaa-aaaaa-aaaba-cai").unwrap();
        let path: Path = [b"canister".as_slice(), canister.as_slice(), b"module_hash".as_slice()]
            .into_iter()
            .collect();
        let bytes = encode_read_state(&[path], 42).unwrap();
        assert_eq!(&bytes[..3], &CBOR_SELF_DESCRIBE);

        let value: Value = serde_cbor::from_slice(&bytes[3..]).unwrap();
        let content = match value {
            Value::Map(map) => map[&Value::Text("content".into())].clone(),
            other => panic!("unexpected {:?}", other),
        };
        let content = match content {
            Value::Map(map) => map,
            other => panic!("unexpected {:?}", other),
        };
        assert_eq!(
            content[&Value::Text("request_type".into())],
            Value::Text("read_state".into())
        );
        assert_eq!(content[&Value::Text("sender".into())], Value::Bytes(vec![0x04]));
        assert_eq!(content[&Value::Text("ingress_expiry".into())], Value::Integer(42));
        assert_eq!(
            content[&Value::Text("paths".into())],
            Value::Array(vec![Value::Array(vec![
                Value::Bytes(b"canister".to_vec()),
                Value::Bytes(canister.as_slice().to_vec()),
                Value::Bytes(b"module_hash".to_vec()),
            ])])
        );
    }
}
