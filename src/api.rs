// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Records reported by the indexing API.
//!
//! Nothing here is trusted. The API may omit any field, so everything
//! beyond the id is optional.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedRef {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubnetInfo {
    #[serde(default)]
    pub subnet_type: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Wasm module metadata. The API returns a partial record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiModule {
    /// Hex-encoded SHA-256 of the installed wasm module.
    pub id: Option<String>,
    pub name: Option<String>,
    pub has_http: Option<bool>,
    pub canister_count: Option<u64>,
    pub has_interface: Option<bool>,
    pub subnet_count: Option<u64>,
    pub source_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleVersion {
    pub created_date: String,
    pub module_hash: String,
}

/// A canister as reported by `/api/canisters/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiCanister {
    pub id: String,
    pub principal: Option<NamedRef>,
    pub created_date: Option<String>,
    pub latest_version_date: Option<String>,
    pub status: Option<String>,
    pub controller: Option<NamedRef>,
    pub controller_id: Option<String>,
    pub subnet: Option<SubnetInfo>,
    pub subnet_id: Option<String>,
    pub has_interface: Option<bool>,
    pub module: Option<ApiModule>,
    pub versions: Option<Vec<ModuleVersion>>,
}

impl ApiCanister {
    pub fn module_hash(&self) -> Option<&str> {
        self.module.as_ref()?.id.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_record_deserializes() {
        let json = r#"{
            "id": "ryjl3-tyaaa-aaaaa-aaaba-cai",
            "controllerId": "r7inp-6aaaa-aaaaa-aaabq-cai",
            "subnetId": "tdb26-jop6k-aogll-7ltgs-eruif-6kk7m-qpktf-gdiqx-mxtrf-vb5e6-eqe",
            "module": { "id": "abcd", "hasHttp": false },
            "status": "Running"
        }"#;
        let record: ApiCanister = serde_json::from_str(json).unwrap();
        assert_eq!(record.module_hash(), Some("abcd"));
        assert_eq!(record.controller_id.as_deref(), Some("r7inp-6aaaa-aaaaa-aaabq-cai"));
        assert!(record.versions.is_none());
    }
}
