// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use std::collections::BTreeMap;

use serde_cbor::Value;

use super::tree_tests::reference_tree;
use crate::certificate::Certificate;
use crate::config::CBOR_SELF_DESCRIBE;
use crate::error::{CertificateError, TreeError};
use crate::fixtures::{self, TestKey};
use crate::verify::CanisterRanges;

fn envelope(entries: Vec<(&str, Value)>) -> Vec<u8> {
    let map: BTreeMap<Value, Value> = entries
        .into_iter()
        .map(|(k, v)| (Value::Text(k.to_string()), v))
        .collect();
    serde_cbor::to_vec(&Value::Map(map)).unwrap()
}

#[test]
fn test_signed_message_layout() {
    let cert = Certificate::new(reference_tree(), [0u8; 48], None);
    let message = cert.signed_message();
    assert_eq!(message[0], 13);
    assert_eq!(&message[1..14], b"ic-state-root");
    assert_eq!(&message[14..], cert.root_hash().as_bytes());
}

#[test]
fn test_wire_form_parses_back() {
    let root = TestKey::from_seed(1);
    let subnet = TestKey::from_seed(2);
    let ranges = CanisterRanges::new(vec![(vec![0; 10], vec![0xff; 10])]);
    let cert = subnet.certify_delegated(reference_tree(), &root, &fixtures::subnet_id(1), &ranges);

    let bytes = cert.to_cbor();
    assert_eq!(&bytes[..3], &CBOR_SELF_DESCRIBE);

    let parsed = Certificate::from_cbor(&bytes).unwrap();
    assert_eq!(parsed, cert);

    let delegation = parsed.delegation().unwrap();
    assert_eq!(delegation.subnet_id, fixtures::subnet_id(1));
    let nested = delegation.parse_certificate().unwrap();
    assert!(nested.delegation().is_none());
}

#[test]
fn test_untagged_envelope_parses() {
    let bytes = envelope(vec![
        ("tree", reference_tree().to_value()),
        ("signature", Value::Bytes(vec![9; 48])),
    ]);
    let cert = Certificate::from_cbor(&bytes).unwrap();
    assert_eq!(cert.signature(), &[9u8; 48]);
    assert!(cert.delegation().is_none());
}

#[test]
fn test_missing_fields_rejected() {
    let no_sig = envelope(vec![("tree", reference_tree().to_value())]);
    assert_eq!(
        Certificate::from_cbor(&no_sig),
        Err(CertificateError::MissingField("signature"))
    );

    let no_tree = envelope(vec![("signature", Value::Bytes(vec![0; 48]))]);
    assert_eq!(
        Certificate::from_cbor(&no_tree),
        Err(CertificateError::MissingField("tree"))
    );

    let mut delegation = BTreeMap::new();
    delegation.insert(Value::Text("subnet_id".into()), Value::Bytes(vec![1, 2, 3]));
    let no_nested = envelope(vec![
        ("tree", reference_tree().to_value()),
        ("signature", Value::Bytes(vec![0; 48])),
        ("delegation", Value::Map(delegation)),
    ]);
    assert_eq!(
        Certificate::from_cbor(&no_nested),
        Err(CertificateError::MissingField("certificate"))
    );
}

#[test]
fn test_bad_field_shapes_rejected() {
    let short_sig = envelope(vec![
        ("tree", reference_tree().to_value()),
        ("signature", Value::Bytes(vec![0; 47])),
    ]);
    assert_eq!(
        Certificate::from_cbor(&short_sig),
        Err(CertificateError::SignatureLength(47))
    );

    let text_sig = envelope(vec![
        ("tree", reference_tree().to_value()),
        ("signature", Value::Text("sig".into())),
    ]);
    assert_eq!(
        Certificate::from_cbor(&text_sig),
        Err(CertificateError::WrongType("signature"))
    );

    let bad_tree = envelope(vec![
        ("tree", Value::Array(vec![Value::Integer(9)])),
        ("signature", Value::Bytes(vec![0; 48])),
    ]);
    assert_eq!(
        Certificate::from_cbor(&bad_tree),
        Err(CertificateError::Tree(TreeError::UnknownTag(9)))
    );

    let not_map = serde_cbor::to_vec(&Value::Array(vec![])).unwrap();
    assert_eq!(Certificate::from_cbor(&not_map), Err(CertificateError::NotAMap));
    assert!(matches!(
        Certificate::from_cbor(b"\xa1"),
        Err(CertificateError::Cbor(_))
    ));
}
