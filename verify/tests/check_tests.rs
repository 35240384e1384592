// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use certwatch_node::config::AuditConfig;
use certwatch_verify::CheckOverrides;

#[test]
fn test_check_flags_override_environment() {
    let mut cfg = AuditConfig::default();
    CheckOverrides {
        host: Some("http://127.0.0.1:4943".into()),
        root_key_hex: Some("ab".repeat(96)),
        now_ns: Some(1_704_067_200_000_000_000),
        ..Default::default()
    }
    .apply(&mut cfg);

    assert_eq!(cfg.ic_host, "http://127.0.0.1:4943");
    assert_eq!(cfg.root_key_hex, "ab".repeat(96));
    assert_eq!(
        cfg.time_window().unwrap().now_ns,
        Some(1_704_067_200_000_000_000)
    );
}

#[test]
fn test_unset_flags_keep_environment() {
    let mut cfg = AuditConfig {
        api_url: "http://index.local".into(),
        now_ns: Some(7),
        ..Default::default()
    };
    CheckOverrides::default().apply(&mut cfg);

    assert_eq!(cfg.api_url, "http://index.local");
    assert_eq!(cfg.now_ns, Some(7));
    assert!(!cfg.ignore_time);

    CheckOverrides {
        ignore_time: true,
        ..Default::default()
    }
    .apply(&mut cfg);
    assert!(cfg.time_window().is_none());
}
