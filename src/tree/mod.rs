// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Certified state hash tree.
//!
//! A sparse, labeled Merkle tree: the replica network reveals the leaves a
//! caller asked for and prunes everything else down to a digest. The root
//! digest is what the subnet signs.
//!
//! # Guarantee
//! Same structure → same digest, bit for bit with the reference scheme.

pub mod decode;
pub mod encode;
pub mod hash;
pub mod lookup;

use core::fmt;

pub use lookup::{LookupResult, SubtreeLookup};

/// A tree label. Labels sort lexicographically by their bytes.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Label(Vec<u8>);

impl Label {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl<T: AsRef<[u8]>> From<T> for Label {
    fn from(bytes: T) -> Self {
        Label(bytes.as_ref().to_vec())
    }
}

impl fmt::Debug for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.iter().all(|b| (32..127).contains(b)) {
            // All bytes are printable ASCII.
            write!(f, "{}", String::from_utf8_lossy(&self.0))
        } else {
            write!(f, "0x{}", hex::encode(&self.0))
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// An ordered label sequence identifying a position in the tree.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Path(Vec<Label>);

impl Path {
    pub fn new(labels: Vec<Label>) -> Self {
        Path(labels)
    }

    pub fn labels(&self) -> &[Label] {
        &self.0
    }

    pub fn push(&mut self, label: impl Into<Label>) {
        self.0.push(label.into());
    }

    /// Returns a new path with `label` appended.
    pub fn join(&self, label: impl Into<Label>) -> Path {
        let mut next = self.clone();
        next.push(label);
        next
    }
}

impl<L: Into<Label>> FromIterator<L> for Path {
    fn from_iter<I: IntoIterator<Item = L>>(iter: I) -> Self {
        Path(iter.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("/");
        }
        for label in &self.0 {
            write!(f, "/{}", label)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Path({})", self)
    }
}

/// A SHA-256 node digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Digest(pub [u8; 32]);

impl Digest {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl From<[u8; 32]> for Digest {
    fn from(bytes: [u8; 32]) -> Self {
        Digest(bytes)
    }
}

impl TryFrom<&[u8]> for Digest {
    type Error = usize;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let array: [u8; 32] = bytes.try_into().map_err(|_| bytes.len())?;
        Ok(Digest(array))
    }
}

/// A (possibly pruned) certified state tree.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum HashTree {
    Empty,
    Fork(Box<(HashTree, HashTree)>),
    Labeled(Label, Box<HashTree>),
    Leaf(Vec<u8>),
    Pruned(Digest),
}

impl HashTree {
    pub fn fork(left: HashTree, right: HashTree) -> Self {
        HashTree::Fork(Box::new((left, right)))
    }

    pub fn labeled(label: impl Into<Label>, subtree: HashTree) -> Self {
        HashTree::Labeled(label.into(), Box::new(subtree))
    }

    pub fn leaf(value: impl AsRef<[u8]>) -> Self {
        HashTree::Leaf(value.as_ref().to_vec())
    }

    pub fn pruned(digest: impl Into<Digest>) -> Self {
        HashTree::Pruned(digest.into())
    }

    /// Recomputes the root digest of the full tree this tree was pruned from.
    pub fn digest(&self) -> Digest {
        match self {
            HashTree::Empty => hash::empty_digest(),
            HashTree::Fork(lr) => hash::fork_digest(&lr.0.digest(), &lr.1.digest()),
            HashTree::Labeled(label, subtree) => hash::labeled_digest(label, &subtree.digest()),
            HashTree::Leaf(value) => hash::leaf_digest(value),
            HashTree::Pruned(digest) => *digest,
        }
    }

    /// Replaces this tree by a `Pruned` node carrying the same digest.
    pub fn prune(&self) -> HashTree {
        HashTree::Pruned(self.digest())
    }

    /// Every path that ends at a revealed leaf, in tree order.
    pub fn list_paths(&self) -> Vec<Path> {
        fn walk(tree: &HashTree, prefix: &mut Vec<Label>, out: &mut Vec<Path>) {
            match tree {
                HashTree::Empty | HashTree::Pruned(_) => {}
                HashTree::Leaf(_) => out.push(Path(prefix.clone())),
                HashTree::Fork(lr) => {
                    walk(&lr.0, prefix, out);
                    walk(&lr.1, prefix, out);
                }
                HashTree::Labeled(label, subtree) => {
                    prefix.push(label.clone());
                    walk(subtree, prefix, out);
                    prefix.pop();
                }
            }
        }

        let mut out = Vec::new();
        walk(self, &mut Vec::new(), &mut out);
        out
    }
}
