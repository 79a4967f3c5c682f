use std::time::Duration;

use augur_types::{AugurError, BackoffConfig, FusionConfig, ReconcilerConfig};

#[test]
fn default_reconciler_config_is_valid() {
    let cfg = ReconcilerConfig::default();
    assert_eq!(cfg.poll_interval, Duration::from_secs(1));
    assert_eq!(cfg.degraded_after, 3);
    assert!(cfg.backoff.is_none());
    cfg.validate().expect("defaults validate");
}

#[test]
fn zero_interval_is_rejected() {
    let cfg = ReconcilerConfig {
        poll_interval: Duration::ZERO,
        ..ReconcilerConfig::default()
    };
    assert!(matches!(cfg.validate(), Err(AugurError::InvalidArg(_))));
}

#[test]
fn inverted_backoff_bounds_are_rejected() {
    let cfg = ReconcilerConfig {
        backoff: Some(BackoffConfig {
            min_backoff_ms: 10_000,
            max_backoff_ms: 1_000,
            ..BackoffConfig::default()
        }),
        ..ReconcilerConfig::default()
    };
    assert!(matches!(cfg.validate(), Err(AugurError::InvalidArg(_))));
}

#[test]
fn reconciler_config_roundtrip() {
    let cfg = ReconcilerConfig {
        poll_interval: Duration::from_millis(2_500),
        fetch_timeout: Duration::from_secs(2),
        degraded_after: 5,
        backoff: Some(BackoffConfig::default()),
    };
    let json = serde_json::to_string(&cfg).expect("serialize config");
    let de: ReconcilerConfig = serde_json::from_str(&json).expect("deserialize config");
    assert_eq!(de, cfg);
}

#[test]
fn fusion_defaults() {
    let f = FusionConfig::default();
    assert!((f.range_margin - 0.02).abs() < f64::EPSILON);
    assert!((f.fallback_band - 0.05).abs() < f64::EPSILON);
}

#[test]
fn transient_classification() {
    assert!(AugurError::quote_fetch("http", "connection reset").is_transient());
    assert!(AugurError::source_timeout("http", 5_000).is_transient());
    assert!(!AugurError::StaleSession { symbol: "A".into() }.is_transient());
    assert!(!AugurError::InvalidArg("x".into()).is_transient());
}
