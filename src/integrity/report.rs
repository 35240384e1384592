// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Discrepancy reports.

use serde::Serialize;

use super::fields::FieldValue;
use crate::types::principal::Principal;

/// Why no authenticated value could be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingReason {
    /// The certificate proves the path does not exist.
    Absent,
    /// The path is hidden inside a pruned subtree.
    Unknown,
    /// The path does not fit the tree's shape.
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiscrepancyKind {
    /// Both sides were read and disagree.
    Mismatch {
        authenticated: Option<FieldValue>,
        api: Option<FieldValue>,
    },
    MissingAuthenticatedValue {
        reason: MissingReason,
        api: Option<FieldValue>,
    },
    /// The certified leaf exists but is not a valid value of its type.
    Undecodable {
        reason: String,
        api: Option<FieldValue>,
    },
}

impl DiscrepancyKind {
    fn tag(&self) -> u8 {
        match self {
            DiscrepancyKind::Mismatch { .. } => 0,
            DiscrepancyKind::MissingAuthenticatedValue { .. } => 1,
            DiscrepancyKind::Undecodable { .. } => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Discrepancy {
    pub field: String,
    #[serde(flatten)]
    pub kind: DiscrepancyKind,
}

impl Discrepancy {
    pub fn authenticated_value(&self) -> Option<&FieldValue> {
        match &self.kind {
            DiscrepancyKind::Mismatch { authenticated, .. } => authenticated.as_ref(),
            _ => None,
        }
    }

    pub fn api_value(&self) -> Option<&FieldValue> {
        match &self.kind {
            DiscrepancyKind::Mismatch { api, .. }
            | DiscrepancyKind::MissingAuthenticatedValue { api, .. }
            | DiscrepancyKind::Undecodable { api, .. } => api.as_ref(),
        }
    }
}

/// Ordered list of every field where certified state and API disagree.
/// Empty means the API agrees with the certificate on all watched fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DiscrepancyReport {
    entries: Vec<Discrepancy>,
}

impl DiscrepancyReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &str, kind: DiscrepancyKind) {
        self.entries.push(Discrepancy {
            field: field.to_string(),
            kind,
        });
    }

    pub fn is_clean(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Discrepancy> {
        self.entries.iter()
    }

    pub fn get(&self, field: &str) -> Option<&Discrepancy> {
        self.entries.iter().find(|d| d.field == field)
    }

    pub fn fields(&self) -> Vec<&str> {
        self.entries.iter().map(|d| d.field.as_str()).collect()
    }

    pub fn into_entries(self) -> Vec<Discrepancy> {
        self.entries
    }

    /// BLAKE3 over a canonical encoding of the entries for `canister_id`.
    ///
    /// Two checks that found the same disagreement produce the same
    /// fingerprint, so alerting can collapse repeats.
    pub fn fingerprint(&self, canister_id: &Principal) -> [u8; 32] {
        fn put(hasher: &mut blake3::Hasher, bytes: &[u8]) {
            hasher.update(&(bytes.len() as u32).to_le_bytes());
            hasher.update(bytes);
        }
        fn put_value(hasher: &mut blake3::Hasher, value: Option<&FieldValue>) {
            match value {
                Some(v) => {
                    hasher.update(&[1]);
                    put(hasher, v.to_string().as_bytes());
                }
                None => {
                    hasher.update(&[0]);
                }
            }
        }

        let mut hasher = blake3::Hasher::new();
        put(&mut hasher, canister_id.as_slice());
        hasher.update(&(self.entries.len() as u32).to_le_bytes());
        for entry in &self.entries {
            put(&mut hasher, entry.field.as_bytes());
            hasher.update(&[entry.kind.tag()]);
            match &entry.kind {
                DiscrepancyKind::Mismatch { authenticated, api } => {
                    put_value(&mut hasher, authenticated.as_ref());
                    put_value(&mut hasher, api.as_ref());
                }
                DiscrepancyKind::MissingAuthenticatedValue { reason, api } => {
                    hasher.update(&[*reason as u8]);
                    put_value(&mut hasher, api.as_ref());
                }
                DiscrepancyKind::Undecodable { reason, api } => {
                    put(&mut hasher, reason.as_bytes());
                    put_value(&mut hasher, api.as_ref());
                }
            }
        }
        *hasher.finalize().as_bytes()
    }
}

impl<'a> IntoIterator for &'a DiscrepancyReport {
    type Item = &'a Discrepancy;
    type IntoIter = std::slice::Iter<'a, Discrepancy>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
