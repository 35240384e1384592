// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Hash tree decoding.
//!
//! ```text
//! hash-tree ::= [0]
//!             | [1 hash-tree hash-tree]
//!             | [2 bytes hash-tree]
//!             | [3 bytes]
//!             | [4 bytes32]
//! ```

use serde_cbor::Value;

use super::{Digest, HashTree, Label};
use crate::config::MAX_TREE_DEPTH;
use crate::error::TreeError;

impl HashTree {
    /// Parses a standalone CBOR-encoded tree.
    pub fn from_cbor(bytes: &[u8]) -> Result<Self, TreeError> {
        let value: Value =
            serde_cbor::from_slice(bytes).map_err(|e| TreeError::Cbor(e.to_string()))?;
        HashTree::try_from(&value)
    }
}

impl TryFrom<&Value> for HashTree {
    type Error = TreeError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        decode_node(value, 0)
    }
}

fn decode_node(value: &Value, depth: usize) -> Result<HashTree, TreeError> {
    if depth > MAX_TREE_DEPTH {
        return Err(TreeError::TooDeep(MAX_TREE_DEPTH));
    }

    let items = match value {
        Value::Array(items) => items,
        Value::Tag(_, inner) => return decode_node(inner, depth),
        _ => return Err(TreeError::NotAnArray),
    };

    let tag = match items.first() {
        Some(Value::Integer(tag)) => *tag,
        _ => return Err(TreeError::NotAnArray),
    };

    match tag {
        0 => {
            expect_arity(0, items, 1)?;
            Ok(HashTree::Empty)
        }
        1 => {
            expect_arity(1, items, 3)?;
            let left = decode_node(&items[1], depth + 1)?;
            let right = decode_node(&items[2], depth + 1)?;
            Ok(HashTree::fork(left, right))
        }
        2 => {
            expect_arity(2, items, 3)?;
            let label = expect_bytes(2, &items[1])?;
            let subtree = decode_node(&items[2], depth + 1)?;
            Ok(HashTree::Labeled(Label::from(label), Box::new(subtree)))
        }
        3 => {
            expect_arity(3, items, 2)?;
            Ok(HashTree::Leaf(expect_bytes(3, &items[1])?.to_vec()))
        }
        4 => {
            expect_arity(4, items, 2)?;
            let bytes = expect_bytes(4, &items[1])?;
            let digest = Digest::try_from(bytes).map_err(TreeError::DigestLength)?;
            Ok(HashTree::Pruned(digest))
        }
        other => Err(TreeError::UnknownTag(other)),
    }
}

fn expect_arity(tag: u8, items: &[Value], expected: usize) -> Result<(), TreeError> {
    if items.len() != expected {
        return Err(TreeError::Arity {
            tag,
            expected,
            found: items.len(),
        });
    }
    Ok(())
}

fn expect_bytes(tag: u8, value: &Value) -> Result<&[u8], TreeError> {
    match value {
        Value::Bytes(bytes) => Ok(bytes),
        _ => Err(TreeError::ExpectedBytes { tag }),
    }
}
