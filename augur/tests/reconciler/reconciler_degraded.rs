use std::time::Duration;

use augur::{AugurError, QuoteTick, ReconcilerConfig};
use augur_mock::MockBehavior;

use crate::helpers::{MSFT, every_second, mock_reconciler, next_live, next_snapshot};

#[tokio::test(start_paused = true)]
async fn degraded_after_three_failures_and_recovers() {
    let (rec, controller) = mock_reconciler(every_second());
    let down = || MockBehavior::Fail(AugurError::quote_fetch("mock", "connection reset"));
    controller
        .script_quotes(
            MSFT,
            [
                MockBehavior::Return(QuoteTick::price(420.0)),
                down(),
                down(),
                down(),
            ],
        )
        .await;
    controller
        .set_quote_behavior(MSFT, MockBehavior::Return(QuoteTick::price(421.0)))
        .await;

    let mut rx = rec.subscribe();
    rec.track(MSFT).await.unwrap();
    assert_eq!(next_snapshot(&mut rx).await.price, 420.0);

    for failures in 1..=3u32 {
        let live = next_live(&mut rx).await;
        assert_eq!(live.consecutive_failures, failures);
        assert_eq!(live.degraded, failures >= 3);
        // A failed tick never clears known good data.
        assert_eq!(live.snapshot.as_ref().map(|s| s.price), Some(420.0));
        assert!(matches!(live.last_error, Some(AugurError::QuoteFetch { .. })));
    }

    let live = next_live(&mut rx).await;
    assert!(!live.degraded);
    assert_eq!(live.consecutive_failures, 0);
    assert_eq!(live.snapshot.unwrap().price, 421.0);
}

#[tokio::test(start_paused = true)]
async fn error_body_fails_and_empty_body_is_a_no_op() {
    let (rec, controller) = mock_reconciler(every_second());
    controller
        .script_quotes(
            MSFT,
            [
                MockBehavior::Return(QuoteTick::price(10.0).with_range(9.5, 10.5)),
                MockBehavior::Return(QuoteTick::error("symbol halted")),
                MockBehavior::Return(QuoteTick::default()),
            ],
        )
        .await;
    controller
        .set_quote_behavior(MSFT, MockBehavior::Return(QuoteTick::default()))
        .await;

    let mut rx = rec.subscribe();
    rec.track(MSFT).await.unwrap();
    let first = next_snapshot(&mut rx).await;

    let after_error = next_live(&mut rx).await;
    assert_eq!(after_error.consecutive_failures, 1);
    assert_eq!(after_error.snapshot.as_ref(), Some(&first));
    assert!(matches!(
        after_error.last_error,
        Some(AugurError::QuoteFetch { ref msg, .. }) if msg == "symbol halted"
    ));

    let after_empty = next_live(&mut rx).await;
    assert_eq!(after_empty.consecutive_failures, 1);
    assert_eq!(after_empty.snapshot.as_ref(), Some(&first));
}

#[tokio::test(start_paused = true)]
async fn hung_fetch_times_out_as_failure() {
    let cfg = ReconcilerConfig {
        fetch_timeout: Duration::from_secs(2),
        ..every_second()
    };
    let (rec, controller) = mock_reconciler(cfg);
    controller.set_quote_behavior(MSFT, MockBehavior::Hang).await;

    let mut rx = rec.subscribe();
    let started = tokio::time::Instant::now();
    rec.track(MSFT).await.unwrap();

    let live = loop {
        let l = next_live(&mut rx).await;
        if l.consecutive_failures > 0 {
            break l;
        }
    };
    assert!(started.elapsed() >= Duration::from_secs(2));
    assert_eq!(
        live.last_error,
        Some(AugurError::source_timeout("mock", 2_000))
    );
}
