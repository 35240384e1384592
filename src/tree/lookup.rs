// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Path lookup.
//!
//! Labels under a node are sorted, and a fork's children cover adjacent
//! label ranges. Comparing the target against each side tells us whether a
//! missing label is provably absent (flanked by revealed neighbours) or
//! merely unknown (it could hide inside a pruned subtree).

use super::{HashTree, Label, Path};

/// Outcome of looking up a leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupResult<'a> {
    /// The leaf exists and was revealed.
    Found(&'a [u8]),
    /// The path provably does not exist.
    Absent,
    /// The path may exist inside a pruned subtree.
    Unknown,
    /// The path does not fit the tree's shape.
    Error,
}

impl<'a> LookupResult<'a> {
    pub fn found(self) -> Option<&'a [u8]> {
        match self {
            LookupResult::Found(value) => Some(value),
            _ => None,
        }
    }
}

/// Outcome of looking up a subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubtreeLookup<'a> {
    Found(&'a HashTree),
    Absent,
    Unknown,
}

/// Where a label sits relative to the labels covered by a subtree.
enum LabelSearch<'a> {
    Found(&'a HashTree),
    Absent,
    Unknown,
    /// Every label in the subtree is greater than the target.
    Less,
    /// Every label in the subtree is smaller than the target.
    Greater,
    /// The subtree covers no labels at all.
    Continue,
}

impl HashTree {
    /// Looks up the leaf at `path`.
    pub fn lookup(&self, path: &Path) -> LookupResult<'_> {
        lookup_labels(self, path.labels())
    }

    /// Looks up the subtree at `path`. An empty path returns the tree itself.
    pub fn lookup_subtree(&self, path: &Path) -> SubtreeLookup<'_> {
        let mut tree = self;
        for label in path.labels() {
            match search_label(tree, label) {
                LabelSearch::Found(subtree) => tree = subtree,
                LabelSearch::Unknown => return SubtreeLookup::Unknown,
                LabelSearch::Absent
                | LabelSearch::Less
                | LabelSearch::Greater
                | LabelSearch::Continue => return SubtreeLookup::Absent,
            }
        }
        SubtreeLookup::Found(tree)
    }

    /// Labels directly below this node that are revealed, in order.
    pub fn child_labels(&self) -> Vec<&Label> {
        fn collect<'a>(tree: &'a HashTree, out: &mut Vec<&'a Label>) {
            match tree {
                HashTree::Fork(lr) => {
                    collect(&lr.0, out);
                    collect(&lr.1, out);
                }
                HashTree::Labeled(label, _) => out.push(label),
                _ => {}
            }
        }

        let mut out = Vec::new();
        collect(self, &mut out);
        out
    }
}

fn lookup_labels<'a>(tree: &'a HashTree, path: &[Label]) -> LookupResult<'a> {
    match path.split_first() {
        None => match tree {
            HashTree::Leaf(value) => LookupResult::Found(value),
            HashTree::Empty => LookupResult::Absent,
            HashTree::Pruned(_) => LookupResult::Unknown,
            HashTree::Fork(_) | HashTree::Labeled(_, _) => LookupResult::Error,
        },
        Some((label, rest)) => {
            // A label remains but the value already ended.
            if let HashTree::Leaf(_) = tree {
                return LookupResult::Error;
            }
            match search_label(tree, label) {
                LabelSearch::Found(subtree) => lookup_labels(subtree, rest),
                LabelSearch::Unknown => LookupResult::Unknown,
                LabelSearch::Absent
                | LabelSearch::Less
                | LabelSearch::Greater
                | LabelSearch::Continue => LookupResult::Absent,
            }
        }
    }
}

fn search_label<'a>(tree: &'a HashTree, label: &Label) -> LabelSearch<'a> {
    match tree {
        HashTree::Labeled(l, subtree) => match label.cmp(l) {
            core::cmp::Ordering::Equal => LabelSearch::Found(subtree),
            core::cmp::Ordering::Less => LabelSearch::Less,
            core::cmp::Ordering::Greater => LabelSearch::Greater,
        },
        HashTree::Fork(lr) => match search_label(&lr.0, label) {
            // Past the left side: the right side decides, and if the target
            // sorts before it, it falls in the gap between the two.
            LabelSearch::Greater => match search_label(&lr.1, label) {
                LabelSearch::Less => LabelSearch::Absent,
                LabelSearch::Continue => LabelSearch::Greater,
                other => other,
            },
            // The left side is opaque: only a hit on the right is conclusive.
            LabelSearch::Unknown => match search_label(&lr.1, label) {
                LabelSearch::Less | LabelSearch::Continue => LabelSearch::Unknown,
                other => other,
            },
            LabelSearch::Continue => search_label(&lr.1, label),
            other => other,
        },
        HashTree::Pruned(_) => LabelSearch::Unknown,
        HashTree::Empty => LabelSearch::Continue,
        HashTree::Leaf(_) => LabelSearch::Absent,
    }
}
