// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use super::tree_tests::reference_tree;
use crate::tree::{HashTree, LookupResult, Path, SubtreeLookup};

fn path(labels: &[&str]) -> Path {
    labels.iter().copied().collect()
}

/// Reference tree with everything left of `/c` pruned.
fn partial_tree() -> HashTree {
    match reference_tree() {
        HashTree::Fork(lr) => {
            let (left, right) = *lr;
            HashTree::fork(left.prune(), right)
        }
        _ => unreachable!(),
    }
}

#[test]
fn test_lookup_found() {
    let tree = reference_tree();
    assert_eq!(tree.lookup(&path(&["a", "x"])), LookupResult::Found(b"hello"));
    assert_eq!(tree.lookup(&path(&["a", "y"])), LookupResult::Found(b"world"));
    assert_eq!(tree.lookup(&path(&["b"])), LookupResult::Found(b"good"));
    assert_eq!(tree.lookup(&path(&["d"])), LookupResult::Found(b"morning"));
}

#[test]
fn test_lookup_absent() {
    let tree = reference_tree();
    // Present label, empty value.
    assert_eq!(tree.lookup(&path(&["c"])), LookupResult::Absent);
    // Sorts between revealed neighbours.
    assert_eq!(tree.lookup(&path(&["a", "z"])), LookupResult::Absent);
    assert_eq!(tree.lookup(&path(&["bb"])), LookupResult::Absent);
    // Before the first and after the last label.
    assert_eq!(tree.lookup(&path(&["0"])), LookupResult::Absent);
    assert_eq!(tree.lookup(&path(&["e"])), LookupResult::Absent);
    assert_eq!(tree.lookup(&path(&["c", "x"])), LookupResult::Absent);
}

#[test]
fn test_lookup_unknown_inside_pruned_subtree() {
    let tree = partial_tree();
    assert_eq!(tree.lookup(&path(&["a", "x"])), LookupResult::Unknown);
    assert_eq!(tree.lookup(&path(&["b"])), LookupResult::Unknown);
    assert_eq!(tree.lookup(&path(&["bb"])), LookupResult::Unknown);
    // Still provable on the revealed side.
    assert_eq!(tree.lookup(&path(&["d"])), LookupResult::Found(b"morning"));
    assert_eq!(tree.lookup(&path(&["c"])), LookupResult::Absent);
    assert_eq!(tree.lookup(&path(&["e"])), LookupResult::Absent);
}

#[test]
fn test_lookup_shape_errors() {
    let tree = reference_tree();
    // Path ends on an inner node.
    assert_eq!(tree.lookup(&path(&["a"])), LookupResult::Error);
    // Path continues below a leaf.
    assert_eq!(tree.lookup(&path(&["b", "x"])), LookupResult::Error);
    assert_eq!(tree.lookup(&Path::default()), LookupResult::Error);
}

#[test]
fn test_lookup_on_bare_nodes() {
    assert_eq!(HashTree::leaf("v").lookup(&Path::default()), LookupResult::Found(b"v"));
    assert_eq!(HashTree::Empty.lookup(&path(&["a"])), LookupResult::Absent);
    assert_eq!(
        HashTree::pruned([7u8; 32]).lookup(&path(&["a"])),
        LookupResult::Unknown
    );
}

#[test]
fn test_binary_labels() {
    let tree = HashTree::labeled(
        vec![0x00, 0xff],
        HashTree::labeled("module_hash", HashTree::leaf([1u8; 32])),
    );
    let found: Path = [vec![0x00, 0xff], b"module_hash".to_vec()].into_iter().collect();
    assert_eq!(tree.lookup(&found), LookupResult::Found(&[1u8; 32]));
    assert_eq!(found.to_string(), "/0x00ff/module_hash");
}

#[test]
fn test_lookup_subtree() {
    let tree = reference_tree();
    match tree.lookup_subtree(&path(&["a"])) {
        SubtreeLookup::Found(subtree) => {
            let labels: Vec<String> = subtree.child_labels().iter().map(|l| l.to_string()).collect();
            assert_eq!(labels, vec!["x", "y"]);
        }
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(tree.lookup_subtree(&path(&["q"])), SubtreeLookup::Absent);
    assert_eq!(
        partial_tree().lookup_subtree(&path(&["a"])),
        SubtreeLookup::Unknown
    );
    assert_eq!(
        tree.lookup_subtree(&Path::default()),
        SubtreeLookup::Found(&tree)
    );
}
