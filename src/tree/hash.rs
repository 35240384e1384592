// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Domain-separated SHA-256 node hashing.
//!
//! # Hash Input Structure
//! ```text
//! domain_sep(s) = len(s) as u8 ++ s
//!
//! Empty        H(domain_sep("ic-hashtree-empty"))
//! Fork(l, r)   H(domain_sep("ic-hashtree-fork")    ++ digest(l) ++ digest(r))
//! Labeled(k,t) H(domain_sep("ic-hashtree-labeled") ++ k ++ digest(t))
//! Leaf(v)      H(domain_sep("ic-hashtree-leaf")    ++ v)
//! Pruned(h)    h
//! ```

use sha2::{Digest as _, Sha256};

use super::{Digest, Label};
use crate::config::{
    DOMAIN_HASHTREE_EMPTY, DOMAIN_HASHTREE_FORK, DOMAIN_HASHTREE_LABELED, DOMAIN_HASHTREE_LEAF,
};

/// Starts a hasher primed with `domain_sep(domain)`.
pub fn domain_hasher(domain: &str) -> Sha256 {
    let mut hasher = Sha256::new();
    hasher.update([domain.len() as u8]);
    hasher.update(domain.as_bytes());
    hasher
}

/// `domain_sep(domain)` as raw bytes.
pub fn domain_sep(domain: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(domain.len() + 1);
    out.push(domain.len() as u8);
    out.extend_from_slice(domain.as_bytes());
    out
}

fn finish(hasher: Sha256) -> Digest {
    Digest(hasher.finalize().into())
}

pub fn empty_digest() -> Digest {
    finish(domain_hasher(DOMAIN_HASHTREE_EMPTY))
}

pub fn fork_digest(left: &Digest, right: &Digest) -> Digest {
    let mut hasher = domain_hasher(DOMAIN_HASHTREE_FORK);
    hasher.update(left.0);
    hasher.update(right.0);
    finish(hasher)
}

pub fn labeled_digest(label: &Label, subtree: &Digest) -> Digest {
    let mut hasher = domain_hasher(DOMAIN_HASHTREE_LABELED);
    hasher.update(label.as_bytes());
    hasher.update(subtree.0);
    finish(hasher)
}

pub fn leaf_digest(value: &[u8]) -> Digest {
    let mut hasher = domain_hasher(DOMAIN_HASHTREE_LEAF);
    hasher.update(value);
    finish(hasher)
}
