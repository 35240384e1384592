// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.

//! certwatch-kernel: certified-state verification for replica network
//! certificates, and cross-checking of indexing API records against them.
//!
//! Layers, bottom-up:
//! - [`tree`]: hash tree digesting, decoding and lookup
//! - [`certificate`] / [`bls`]: envelope parsing and signature checks
//! - [`verify`]: chain of trust down to the root key
//! - [`integrity`]: watched fields and discrepancy reports

pub mod api;
pub mod bls;
pub mod certificate;
pub mod config;
pub mod error;
pub mod integrity;
pub mod tree;
pub mod types;
pub mod verify;

#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;

#[cfg(test)]
pub mod tests;

pub use bls::PublicKey;
pub use certificate::{Certificate, Delegation};
pub use error::{CertificateError, CheckError, FetchError, TreeError, VerificationError};
pub use integrity::{DiscrepancyReport, IntegrityChecker, StateReader};
pub use tree::{HashTree, Label, LookupResult, Path};
pub use types::principal::Principal;
pub use verify::{CertificateVerifier, TimeWindow, VerifiedCertificate};
