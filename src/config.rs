// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Protocol constants.
//!
//! Every value here is fixed by the replica network's certification
//! scheme. Changing any of them breaks verification against real
//! certificates.

/// Domain separator of an `Empty` node digest.
pub const DOMAIN_HASHTREE_EMPTY: &str = "ic-hashtree-empty";

/// Domain separator of a `Fork` node digest.
pub const DOMAIN_HASHTREE_FORK: &str = "ic-hashtree-fork";

/// Domain separator of a `Labeled` node digest.
pub const DOMAIN_HASHTREE_LABELED: &str = "ic-hashtree-labeled";

/// Domain separator of a `Leaf` node digest.
pub const DOMAIN_HASHTREE_LEAF: &str = "ic-hashtree-leaf";

/// Domain separator prepended to the root hash before signing.
pub const DOMAIN_STATE_ROOT: &str = "ic-state-root";

/// BLS hash-to-curve ciphersuite (min-sig: signatures in G1, keys in G2).
pub const BLS_DST: &[u8] = b"BLS_SIG_BLS12381G1_XMD:SHA-256_SSWU_RO_NUL_";

/// Compressed G1 signature length.
pub const SIGNATURE_LEN: usize = 48;

/// Compressed G2 public key length.
pub const PUBLIC_KEY_LEN: usize = 96;

/// SubjectPublicKeyInfo prefix of a DER-wrapped BLS12-381 G2 key.
pub const DER_PREFIX: [u8; 37] = [
    0x30, 0x81, 0x82, 0x30, 0x1d, 0x06, 0x0d, 0x2b, 0x06, 0x01, 0x04, 0x01, 0x82, 0xdc, 0x7c, 0x05,
    0x03, 0x01, 0x02, 0x01, 0x06, 0x0c, 0x2b, 0x06, 0x01, 0x04, 0x01, 0x82, 0xdc, 0x7c, 0x05, 0x03,
    0x02, 0x01, 0x03, 0x61, 0x00,
];

/// DER length of a wrapped key: prefix + compressed G2 point.
pub const DER_KEY_LEN: usize = DER_PREFIX.len() + PUBLIC_KEY_LEN;

/// Mainnet root public key, DER encoded (hex).
pub const MAINNET_ROOT_KEY_DER_HEX: &str = "308182301d060d2b0601040182dc7c0503010201060c2b0601040182dc7c05030201036100814c0e6ec71fab583b08bd81373c255c3c371b2e84863c98a4f1e08b74235d14fb5d9c0cd546d9685f913a0c0b2cc5341583bf4b4392e467db96d65b9bb4cb717112f8472e0d5a4d14505ffd7484b01291091c5f87b98883463f98091a0baaae";

/// Maximum number of nested delegations. The protocol only ever
/// produces one: subnet certificate signed under an NNS-certified key.
pub const MAX_DELEGATION_DEPTH: usize = 1;

/// Maximum nesting of tree nodes accepted by the parser.
pub const MAX_TREE_DEPTH: usize = 128;

/// Maximum length of a principal in bytes.
pub const MAX_PRINCIPAL_LEN: usize = 29;

/// CBOR self-describe tag 55799 (`d9 d9 f7`).
pub const CBOR_SELF_DESCRIBE: [u8; 3] = [0xd9, 0xd9, 0xf7];

/// Default allowed certificate age for the time check (seconds).
pub const DEFAULT_MAX_CERT_AGE_SECS: u64 = 300;

/// Default allowed clock skew into the future (seconds).
pub const DEFAULT_MAX_FUTURE_SKEW_SECS: u64 = 300;
