// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Hash tree encoding.

use serde_cbor::Value;

use super::HashTree;

impl HashTree {
    pub fn to_value(&self) -> Value {
        match self {
            HashTree::Empty => Value::Array(vec![Value::Integer(0)]),
            HashTree::Fork(lr) => {
                Value::Array(vec![Value::Integer(1), lr.0.to_value(), lr.1.to_value()])
            }
            HashTree::Labeled(label, subtree) => Value::Array(vec![
                Value::Integer(2),
                Value::Bytes(label.as_bytes().to_vec()),
                subtree.to_value(),
            ]),
            HashTree::Leaf(value) => Value::Array(vec![Value::Integer(3), Value::Bytes(value.clone())]),
            HashTree::Pruned(digest) => {
                Value::Array(vec![Value::Integer(4), Value::Bytes(digest.0.to_vec())])
            }
        }
    }

    pub fn to_cbor(&self) -> Vec<u8> {
        // Serializing an in-memory Value into a Vec cannot fail.
        serde_cbor::to_vec(&self.to_value()).unwrap_or_default()
    }
}
