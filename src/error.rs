// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Error types.
//!
//! Parse failures and trust failures are fatal to a single check and are
//! kept in separate enums so callers can never confuse "the bytes were
//! garbage" with "the bytes were forged". Per-field lookup problems are not
//! errors at all; they end up in the [`crate::integrity::DiscrepancyReport`].

use thiserror::Error;

use crate::types::principal::Principal;

/// Structural failure while decoding a hash tree (`MalformedTree`).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("CBOR decoding failed: {0}")]
    Cbor(String),

    #[error("Unknown tree node tag: {0}")]
    UnknownTag(i128),

    #[error("Tree node with tag {tag} has {found} elements, expected {expected}")]
    Arity { tag: u8, expected: usize, found: usize },

    #[error("Tree node is not a tagged array")]
    NotAnArray,

    #[error("Expected a byte string in tree node with tag {tag}")]
    ExpectedBytes { tag: u8 },

    #[error("Pruned digest has length {0}, expected 32")]
    DigestLength(usize),

    #[error("Tree nesting exceeds {0} levels")]
    TooDeep(usize),
}

/// Failure to parse a certificate envelope (`MalformedCertificate`).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CertificateError {
    #[error("CBOR decoding failed: {0}")]
    Cbor(String),

    #[error("Certificate is not a CBOR map")]
    NotAMap,

    #[error("Missing required field `{0}`")]
    MissingField(&'static str),

    #[error("Field `{0}` has the wrong type")]
    WrongType(&'static str),

    #[error("Signature has length {0}, expected 48")]
    SignatureLength(usize),

    #[error("Malformed tree: {0}")]
    Tree(#[from] TreeError),

    #[error("Malformed subnet id: {0}")]
    SubnetId(#[from] PrincipalError),
}

/// Trust failure: the certificate parsed but must not be believed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerificationError {
    #[error("Invalid BLS signature")]
    InvalidSignature,

    #[error("Certificate subnet {actual:?} does not match expected subnet {expected}")]
    UnknownSubnet {
        expected: Principal,
        actual: Option<Principal>,
    },

    #[error("Canister {canister_id} is outside the ranges delegated to subnet {subnet_id}")]
    CanisterOutOfRange {
        canister_id: Principal,
        subnet_id: Principal,
    },

    #[error("Certificate time {time_ns}ns is outside [{not_before_ns}ns, {not_after_ns}ns]")]
    ExpiredOrFutureCertificate {
        time_ns: u64,
        not_before_ns: u64,
        not_after_ns: u64,
    },

    #[error("Certificate carries no /time leaf but a time window is required")]
    MissingTime,

    #[error("Delegation certificate has no public key for subnet {0}")]
    MissingDelegationKey(Principal),

    #[error("Delegation chain deeper than {0}")]
    DelegationTooDeep(usize),

    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("Malformed delegation certificate: {0}")]
    Delegation(#[from] CertificateError),

    #[error("Malformed certified metadata at {path}: {reason}")]
    MalformedMetadata { path: String, reason: String },
}

/// Principal text or byte form is invalid.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PrincipalError {
    #[error("Principal is {0} bytes, maximum is 29")]
    TooLong(usize),

    #[error("Invalid principal text: {0}")]
    InvalidText(String),

    #[error("Principal checksum mismatch")]
    Checksum,
}

/// A leaf value could not be decoded to its semantic type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Expected {expected} bytes, found {found}")]
    Length { expected: usize, found: usize },

    #[error("Invalid principal: {0}")]
    Principal(#[from] PrincipalError),

    #[error("Invalid LEB128 number")]
    Leb128,
}

pub type Result<T> = std::result::Result<T, VerificationError>;

/// Failure of the network collaborator. Transient: callers may retry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out")]
    Timeout,
}

/// Why a single entity's check produced no report.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckError {
    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Malformed certificate: {0}")]
    Certificate(#[from] CertificateError),

    #[error("Certificate verification failed: {0}")]
    Verification(VerificationError),
}

impl From<VerificationError> for CheckError {
    fn from(e: VerificationError) -> Self {
        match e {
            // Unparseable delegation: malformed, not untrusted.
            VerificationError::Delegation(inner) => CheckError::Certificate(inner),
            other => CheckError::Verification(other),
        }
    }
}

impl CheckError {
    /// Only transport failures are retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CheckError::Fetch(_))
    }

    /// Signature chain, subnet or time check failed.
    pub fn is_trust_failure(&self) -> bool {
        matches!(self, CheckError::Verification(_))
    }
}
