// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Test fixtures: deterministic keys and signed certificates.
//!
//! Enabled for this crate's tests and, through the `fixtures` feature, for
//! the node and verify crates' tests.

use std::collections::BTreeMap;

use blst::min_sig::SecretKey;

use crate::bls::PublicKey;
use crate::certificate::{signed_message_for, Certificate, Delegation};
use crate::config::BLS_DST;
use crate::integrity::fields::{controller_path, module_hash_path};
use crate::tree::{HashTree, Path};
use crate::types::leb128;
use crate::types::principal::Principal;
use crate::verify::{subnet_path, time_path, CanisterRanges};

/// A BLS key pair derived from a one-byte seed.
pub struct TestKey {
    secret: SecretKey,
}

impl TestKey {
    pub fn from_seed(seed: u8) -> Self {
        let ikm = [seed; 32];
        let secret = SecretKey::key_gen(&ikm, &[]).expect("32-byte ikm is always accepted");
        Self { secret }
    }

    pub fn public_key(&self) -> PublicKey {
        let compressed = self.secret.sk_to_pk().compress();
        PublicKey::from_bytes(&compressed).expect("compressed G2 key is 96 bytes")
    }

    pub fn sign_tree(&self, tree: &HashTree) -> [u8; 48] {
        let message = signed_message_for(&tree.digest());
        self.secret.sign(&message, BLS_DST, &[]).compress()
    }

    /// A certificate over `tree` signed directly by this key.
    pub fn certify(&self, tree: HashTree) -> Certificate {
        let signature = self.sign_tree(&tree);
        Certificate::new(tree, signature, None)
    }

    /// A certificate over `tree` signed by this (subnet) key, delegated from `root`.
    pub fn certify_delegated(
        &self,
        tree: HashTree,
        root: &TestKey,
        subnet_id: &Principal,
        ranges: &CanisterRanges,
    ) -> Certificate {
        let subnet = subnet_path(subnet_id);
        let delegation_tree = tree_from_leaves(vec![
            (subnet.join("canister_ranges"), ranges.to_cbor()),
            (subnet.join("public_key"), self.public_key().to_der()),
        ]);
        let delegation_cert = root.certify(delegation_tree);

        let signature = self.sign_tree(&tree);
        Certificate::new(
            tree,
            signature,
            Some(Delegation {
                subnet_id: subnet_id.clone(),
                certificate: delegation_cert.to_cbor(),
            }),
        )
    }
}

enum Node {
    Leaf(Vec<u8>),
    Children(BTreeMap<Vec<u8>, Node>),
}

/// Builds a fully revealed, correctly sorted tree from `(path, value)` pairs.
pub fn tree_from_leaves(leaves: Vec<(Path, Vec<u8>)>) -> HashTree {
    let mut root = BTreeMap::new();
    for (path, value) in leaves {
        let labels = path.labels();
        let mut level = &mut root;
        for (i, label) in labels.iter().enumerate() {
            let key = label.as_bytes().to_vec();
            if i + 1 == labels.len() {
                level.insert(key, Node::Leaf(value.clone()));
                break;
            }
            let entry = level
                .entry(key)
                .or_insert_with(|| Node::Children(BTreeMap::new()));
            level = match entry {
                Node::Children(children) => children,
                Node::Leaf(_) => panic!("path {} runs through a leaf", path),
            };
        }
    }
    build_children(root)
}

fn build_children(children: BTreeMap<Vec<u8>, Node>) -> HashTree {
    let nodes: Vec<HashTree> = children
        .into_iter()
        .map(|(label, node)| {
            let subtree = match node {
                Node::Leaf(value) => HashTree::Leaf(value),
                Node::Children(grandchildren) => build_children(grandchildren),
            };
            HashTree::labeled(label, subtree)
        })
        .collect();
    balance(nodes)
}

fn balance(mut nodes: Vec<HashTree>) -> HashTree {
    match nodes.len() {
        0 => HashTree::Empty,
        1 => nodes.remove(0),
        n => {
            let right = nodes.split_off(n / 2);
            HashTree::fork(balance(nodes), balance(right))
        }
    }
}

/// `/canister/<id>/{module_hash,controller}` plus `/time`.
pub fn canister_tree(
    canister_id: &Principal,
    module_hash: [u8; 32],
    controller: &Principal,
    time_ns: u64,
) -> HashTree {
    tree_from_leaves(vec![
        (module_hash_path(canister_id), module_hash.to_vec()),
        (controller_path(canister_id), controller.as_slice().to_vec()),
        (time_path(), leb128::encode_u64(time_ns)),
    ])
}

/// A ten-byte canister id, as the replica network allocates them.
pub fn canister_id(index: u64) -> Principal {
    let mut bytes = index.to_be_bytes().to_vec();
    bytes.extend_from_slice(&[0x01, 0x01]);
    Principal::from_slice(&bytes).expect("10 bytes")
}

/// A self-authenticating style principal (29 bytes).
pub fn user_principal(seed: u8) -> Principal {
    let mut bytes = vec![seed; 28];
    bytes.push(0x02);
    Principal::from_slice(&bytes).expect("29 bytes")
}

/// A subnet id (29 bytes, type 0x02).
pub fn subnet_id(seed: u8) -> Principal {
    let mut bytes = vec![0x5a ^ seed; 28];
    bytes.push(0x02);
    Principal::from_slice(&bytes).expect("29 bytes")
}

/// 0x01, 0x02, .., 0x20
pub fn sequential_hash() -> [u8; 32] {
    let mut hash = [0u8; 32];
    for (i, byte) in hash.iter_mut().enumerate() {
        *byte = i as u8 + 1;
    }
    hash
}

/// A fixed certified time: 2024-01-01T00:00:00Z.
pub const FIXED_TIME_NS: u64 = 1_704_067_200_000_000_000;
