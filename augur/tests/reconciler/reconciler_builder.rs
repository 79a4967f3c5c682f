use std::sync::Arc;
use std::time::Duration;

use augur::{AugurError, BackoffConfig, Reconciler};
use augur_mock::MockSource;

#[test]
fn build_requires_a_source() {
    let err = Reconciler::builder().build().err().unwrap();
    assert!(matches!(err, AugurError::InvalidArg(_)));
}

#[test]
fn build_rejects_invalid_config() {
    let zero = Reconciler::builder()
        .source(Arc::new(MockSource::new()))
        .poll_interval(Duration::ZERO)
        .build();
    assert!(matches!(zero, Err(AugurError::InvalidArg(_))));

    let inverted = Reconciler::builder()
        .source(Arc::new(MockSource::new()))
        .backoff(BackoffConfig {
            min_backoff_ms: 10_000,
            max_backoff_ms: 1_000,
            ..BackoffConfig::default()
        })
        .build();
    assert!(matches!(inverted, Err(AugurError::InvalidArg(_))));

    let never = Reconciler::builder()
        .source(Arc::new(MockSource::new()))
        .degraded_after(0)
        .build();
    assert!(matches!(never, Err(AugurError::InvalidArg(_))));
}

#[test]
fn builder_settings_are_applied() {
    let rec = Reconciler::builder()
        .source(Arc::new(MockSource::new()))
        .poll_interval(Duration::from_secs(5))
        .fetch_timeout(Duration::from_secs(2))
        .degraded_after(4)
        .build()
        .unwrap();
    let cfg = rec.config();
    assert_eq!(cfg.poll_interval, Duration::from_secs(5));
    assert_eq!(cfg.fetch_timeout, Duration::from_secs(2));
    assert_eq!(cfg.degraded_after, 4);
    assert!(cfg.backoff.is_none());
}

#[tokio::test]
async fn track_rejects_blank_symbol_and_bad_anchor() {
    let rec = Reconciler::builder()
        .source(Arc::new(MockSource::new()))
        .build()
        .unwrap();
    assert!(matches!(rec.track("  ").await, Err(AugurError::InvalidArg(_))));
    assert!(matches!(
        rec.track_with_anchor("AAPL", f64::NAN).await,
        Err(AugurError::InvalidArg(_))
    ));
    assert_eq!(rec.poll_once().await, Err(AugurError::NoActiveSession));
}

#[tokio::test(start_paused = true)]
async fn static_mock_error_symbols_degrade() {
    let rec = Reconciler::builder()
        .source(Arc::new(MockSource::new()))
        .build()
        .unwrap();
    let mut rx = rec.subscribe();
    rec.track("ERROR").await.unwrap();
    let live = rx.wait_for(|l| l.degraded).await.unwrap().clone();
    assert_eq!(live.consecutive_failures, 3);
    assert!(live.snapshot.is_none());
    rec.shutdown().await;
}
