// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use certwatch_kernel::bls::PublicKey;
use certwatch_kernel::config::{
    DEFAULT_MAX_CERT_AGE_SECS, DEFAULT_MAX_FUTURE_SKEW_SECS, MAINNET_ROOT_KEY_DER_HEX,
};
use certwatch_kernel::types::principal::Principal;
use certwatch_kernel::verify::{CertificateVerifier, TimeWindow};

use crate::errors::NodeError;

pub const DEFAULT_IC_HOST: &str = "https://icp-api.io";
pub const DEFAULT_API_URL: &str = "https://ic-api.internetcomputer.org";
/// Requests expire this long after they are built.
pub const DEFAULT_INGRESS_EXPIRY_SECS: u64 = 240;

#[derive(Debug, Clone)]
pub struct AuditConfig {
    pub ic_host: String,
    pub api_url: String,
    /// Hex, raw or DER.
    pub root_key_hex: String,
    pub timeout: Duration,
    pub max_concurrency: usize,
    pub max_cert_age: Duration,
    pub max_future_skew: Duration,
    /// Skip the freshness check entirely.
    pub ignore_time: bool,
    /// Fixed "now" for the freshness check, in nanoseconds. `None` reads the clock.
    pub now_ns: Option<u64>,
    pub ingress_expiry: Duration,
    /// Canisters audited on every round.
    pub canisters: Vec<Principal>,
    /// Seconds between rounds. `None` runs a single round.
    pub interval_secs: Option<u64>,
    pub bind_addr: SocketAddr,
    pub auth_token: Option<String>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            ic_host: DEFAULT_IC_HOST.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            root_key_hex: MAINNET_ROOT_KEY_DER_HEX.to_string(),
            timeout: Duration::from_secs(30),
            max_concurrency: 8,
            max_cert_age: Duration::from_secs(DEFAULT_MAX_CERT_AGE_SECS),
            max_future_skew: Duration::from_secs(DEFAULT_MAX_FUTURE_SKEW_SECS),
            ignore_time: false,
            now_ns: None,
            ingress_expiry: Duration::from_secs(DEFAULT_INGRESS_EXPIRY_SECS),
            canisters: Vec::new(),
            interval_secs: None,
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            auth_token: None,
        }
    }
}

impl AuditConfig {
    /// Defaults overridden by `CERTWATCH_*` environment variables.
    pub fn from_env() -> Result<Self, NodeError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, NodeError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(host) = lookup("CERTWATCH_IC_HOST") {
            cfg.ic_host = host;
        }
        if let Some(url) = lookup("CERTWATCH_API_URL") {
            cfg.api_url = url;
        }
        if let Some(key) = lookup("CERTWATCH_ROOT_KEY") {
            cfg.root_key_hex = key;
        }
        if let Some(secs) = lookup("CERTWATCH_TIMEOUT_SECS") {
            cfg.timeout = Duration::from_secs(parse("CERTWATCH_TIMEOUT_SECS", &secs)?);
        }
        if let Some(n) = lookup("CERTWATCH_MAX_CONCURRENCY") {
            cfg.max_concurrency = parse("CERTWATCH_MAX_CONCURRENCY", &n)?;
        }
        if let Some(secs) = lookup("CERTWATCH_MAX_CERT_AGE_SECS") {
            cfg.max_cert_age = Duration::from_secs(parse("CERTWATCH_MAX_CERT_AGE_SECS", &secs)?);
        }
        if let Some(flag) = lookup("CERTWATCH_IGNORE_TIME") {
            cfg.ignore_time = parse("CERTWATCH_IGNORE_TIME", &flag)?;
        }
        if let Some(list) = lookup("CERTWATCH_CANISTERS") {
            cfg.canisters = list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(Principal::from_text)
                .collect::<Result<_, _>>()
                .map_err(|e| NodeError::Config(format!("CERTWATCH_CANISTERS: {}", e)))?;
        }
        if let Some(secs) = lookup("CERTWATCH_INTERVAL_SECS") {
            cfg.interval_secs = Some(parse("CERTWATCH_INTERVAL_SECS", &secs)?);
        }
        if let Some(addr) = lookup("CERTWATCH_BIND_ADDR") {
            cfg.bind_addr = parse("CERTWATCH_BIND_ADDR", &addr)?;
        }
        cfg.auth_token = lookup("CERTWATCH_AUTH_TOKEN").filter(|t| !t.is_empty());

        if cfg.max_concurrency == 0 {
            return Err(NodeError::Config("CERTWATCH_MAX_CONCURRENCY must be at least 1".into()));
        }
        Ok(cfg)
    }

    pub fn root_key(&self) -> Result<PublicKey, NodeError> {
        Ok(PublicKey::from_hex(&self.root_key_hex)?)
    }

    pub fn time_window(&self) -> Option<TimeWindow> {
        if self.ignore_time {
            return None;
        }
        Some(TimeWindow {
            max_age: self.max_cert_age,
            max_future_skew: self.max_future_skew,
            now_ns: self.now_ns,
        })
    }

    pub fn verifier(&self) -> Result<CertificateVerifier, NodeError> {
        let verifier = CertificateVerifier::new(self.root_key()?);
        Ok(match self.time_window() {
            Some(window) => verifier.with_time_window(window),
            None => verifier,
        })
    }
}

fn parse<T: FromStr>(name: &str, value: &str) -> Result<T, NodeError>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| NodeError::Config(format!("{}: {}", name, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_use_mainnet_key() {
        let cfg = AuditConfig::default();
        assert_eq!(cfg.root_key().unwrap(), PublicKey::mainnet().unwrap());
        assert_eq!(cfg.max_concurrency, 8);
        assert!(cfg.time_window().is_some());
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("CERTWATCH_IC_HOST", "http://127.0.0.1:4943"),
            ("CERTWATCH_MAX_CONCURRENCY", "2"),
            ("CERTWATCH_TIMEOUT_SECS", "5"),
            ("CERTWATCH_CANISTERS", "ryjl3-tyaaa-aaaaa-aaaba-cai, aaaaa-aa"),
            ("CERTWATCH_IGNORE_TIME", "true"),
        ]
        .into_iter()
        .collect();
        let cfg = AuditConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();

        assert_eq!(cfg.ic_host, "http://127.0.0.1:4943");
        assert_eq!(cfg.max_concurrency, 2);
        assert_eq!(cfg.timeout, Duration::from_secs(5));
        assert_eq!(cfg.canisters.len(), 2);
        assert!(cfg.time_window().is_none());
    }

    #[test]
    fn test_bad_values_rejected() {
        let bad = |key: &'static str, value: &'static str| {
            AuditConfig::from_lookup(move |k| (k == key).then(|| value.to_string())).is_err()
        };
        assert!(bad("CERTWATCH_MAX_CONCURRENCY", "0"));
        assert!(bad("CERTWATCH_TIMEOUT_SECS", "soon"));
        assert!(bad("CERTWATCH_CANISTERS", "not-a-principal"));
    }

    #[test]
    fn test_fixed_now_reaches_time_window() {
        let cfg = AuditConfig {
            now_ns: Some(42),
            ..Default::default()
        };
        assert_eq!(cfg.time_window().unwrap().now_ns, Some(42));
    }
}
