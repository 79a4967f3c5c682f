use std::time::Duration;

use augur::{AugurError, QuoteTick, ReconcilerConfig};
use augur_mock::MockBehavior;

use crate::helpers::{AAPL, MSFT, mock_reconciler, next_snapshot, yield_until_requests};

fn hourly() -> ReconcilerConfig {
    ReconcilerConfig {
        poll_interval: Duration::from_secs(3_600),
        ..ReconcilerConfig::default()
    }
}

#[tokio::test(start_paused = true)]
async fn tick_resolving_after_switch_never_touches_new_symbol() {
    let (rec, controller) = mock_reconciler(hourly());
    controller
        .script_quotes(
            AAPL,
            [
                MockBehavior::Return(QuoteTick::price(190.0)),
                MockBehavior::Delay(Duration::from_secs(5), QuoteTick::price(1.0)),
            ],
        )
        .await;
    controller
        .set_quote_behavior(MSFT, MockBehavior::Return(QuoteTick::price(420.0)))
        .await;

    let mut rx = rec.subscribe();
    rec.track(AAPL).await.unwrap();
    assert_eq!(next_snapshot(&mut rx).await.price, 190.0);
    let aapl_session = rec.current().session;

    // Manual tick for AAPL, still outstanding when the symbol switches.
    let pending = tokio::spawn({
        let rec = rec.clone();
        async move { rec.poll_once().await }
    });
    yield_until_requests(&controller, 2).await;

    rec.track(MSFT).await.unwrap();
    let msft = next_snapshot(&mut rx).await;
    assert_eq!(msft.symbol, MSFT);
    assert_eq!(msft.price, 420.0);

    let res = pending.await.unwrap();
    assert_eq!(
        res,
        Err(AugurError::StaleSession {
            symbol: AAPL.to_string()
        })
    );

    let now = rec.current();
    assert_ne!(now.session, aapl_session);
    assert_eq!(now.symbol.as_deref(), Some(MSFT));
    let snap = now.snapshot.unwrap();
    assert_eq!(snap, msft);
    assert_eq!(snap.anchor_price, 420.0);
    assert_eq!(snap.day_low, 420.0);
}

#[tokio::test(start_paused = true)]
async fn disable_discards_outstanding_tick() {
    let (rec, controller) = mock_reconciler(hourly());
    controller
        .set_quote_behavior(
            AAPL,
            MockBehavior::Delay(Duration::from_secs(5), QuoteTick::price(190.0)),
        )
        .await;

    rec.track(AAPL).await.unwrap();
    yield_until_requests(&controller, 1).await;
    rec.disable().await;

    tokio::time::sleep(Duration::from_secs(10)).await;
    let live = rec.current();
    assert!(live.symbol.is_none());
    assert!(live.snapshot.is_none());
    assert_eq!(controller.quote_requests().await.len(), 1);
    assert_eq!(rec.poll_once().await, Err(AugurError::NoActiveSession));
}

#[tokio::test(start_paused = true)]
async fn switching_resets_anchor_and_range() {
    let (rec, controller) = mock_reconciler(hourly());
    controller
        .set_quote_behavior(
            AAPL,
            MockBehavior::Return(QuoteTick::price(190.0).with_range(185.0, 195.0)),
        )
        .await;
    controller
        .set_quote_behavior(MSFT, MockBehavior::Return(QuoteTick::price(420.0)))
        .await;

    let mut rx = rec.subscribe();
    rec.track(AAPL).await.unwrap();
    assert_eq!(next_snapshot(&mut rx).await.day_low, 185.0);

    rec.track(MSFT).await.unwrap();
    let snap = next_snapshot(&mut rx).await;
    assert_eq!(snap.day_low, 420.0);
    assert_eq!(snap.day_high, 420.0);
    assert_eq!(snap.delta, 0.0);
    assert!(!snap.is_increasing);
}
