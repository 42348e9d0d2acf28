use chartwell_types::{
    CacheConfig, ChartwellError, EngineConfig, PolicyOverride, RefreshConfig, TimeRange,
};

#[test]
fn refresh_config_roundtrip() {
    let cfg = RefreshConfig {
        interval: std::time::Duration::from_secs(45),
        jitter_percent: 25,
        fetch_timeout: std::time::Duration::from_millis(1500),
    };

    let json = serde_json::to_string(&cfg).expect("serialize refresh config");
    let de: RefreshConfig = serde_json::from_str(&json).expect("deserialize refresh config");

    assert_eq!(de, cfg);
}

#[test]
fn refresh_durations_use_secs_and_nanos() {
    let json = serde_json::to_value(RefreshConfig::default()).expect("serialize refresh config");

    assert_eq!(json["interval"], serde_json::json!({ "secs": 30, "nanos": 0 }));
    assert_eq!(json["fetch_timeout"], serde_json::json!({ "secs": 5, "nanos": 0 }));
}

#[test]
fn engine_config_fills_missing_fields_with_defaults() {
    let de: EngineConfig =
        serde_json::from_str(r#"{"timezone":"America/New_York"}"#).expect("partial config");

    assert_eq!(de.timezone, "America/New_York");
    assert_eq!(de.intraday_fallback_threshold, 10);
    assert_eq!(de.palette.len(), 10);
    assert!(de.policy_overrides.is_empty());
}

#[test]
fn policy_override_uses_wire_range_names() {
    let json = r#"{"policy_overrides":[{"range":"5Y","point_budget":120}]}"#;
    let de: EngineConfig = serde_json::from_str(json).expect("override config");

    assert_eq!(
        de.policy_overrides,
        vec![PolicyOverride {
            range: TimeRange::Y5,
            cutoff_secs: None,
            point_budget: Some(120),
        }]
    );
    assert!(de.validate().is_ok());
}

#[test]
fn duplicate_override_is_rejected() {
    let cfg = EngineConfig {
        policy_overrides: vec![
            PolicyOverride {
                range: TimeRange::D7,
                cutoff_secs: None,
                point_budget: Some(10),
            },
            PolicyOverride {
                range: TimeRange::D7,
                cutoff_secs: Some(3600),
                point_budget: None,
            },
        ],
        ..EngineConfig::default()
    };

    assert!(matches!(cfg.validate(), Err(ChartwellError::InvalidArg(_))));
}

#[test]
fn zero_cutoff_is_rejected() {
    let cfg = EngineConfig {
        policy_overrides: vec![PolicyOverride {
            range: TimeRange::D1,
            cutoff_secs: Some(0),
            point_budget: None,
        }],
        ..EngineConfig::default()
    };

    assert!(cfg.validate().is_err());
}

#[test]
fn cache_config_default() {
    assert_eq!(CacheConfig::default().max_entries, 64);
}
