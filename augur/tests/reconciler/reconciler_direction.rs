use augur::{MarketState, QuoteTick};
use augur_mock::MockBehavior;

use crate::helpers::{AAPL, every_second, mock_reconciler, next_snapshot};

#[tokio::test(start_paused = true)]
async fn direction_flips_exactly_on_alternating_ticks() {
    let (rec, controller) = mock_reconciler(every_second());
    let prices = [100.0, 101.0, 100.5, 102.0, 101.0, 103.0];
    controller
        .script_quotes(
            AAPL,
            prices.iter().map(|p| MockBehavior::Return(QuoteTick::price(*p))),
        )
        .await;
    controller
        .set_quote_behavior(AAPL, MockBehavior::Return(QuoteTick::price(103.0)))
        .await;

    let mut rx = rec.subscribe();
    rec.track(AAPL).await.unwrap();

    let mut prev: Option<f64> = None;
    for (k, price) in prices.iter().enumerate() {
        let snap = next_snapshot(&mut rx).await;
        assert_eq!(snap.price, *price, "tick {k}");
        let expected = prev.is_some_and(|p| *price > p);
        assert_eq!(snap.is_increasing, expected, "tick {k}");
        assert_eq!(snap.previous_reference_price, prev.unwrap_or(*price));
        assert_eq!(snap.anchor_price, 100.0);
        assert!((snap.delta - (price - 100.0)).abs() < 1e-9);
        prev = Some(*price);
    }

    rec.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn anchor_drives_delta_not_direction() {
    let (rec, controller) = mock_reconciler(every_second());
    let mut first = QuoteTick::price(102.0);
    first.market_state = Some(MarketState::Pre);
    controller
        .script_quotes(
            AAPL,
            [
                MockBehavior::Return(first),
                MockBehavior::Return(QuoteTick::price(101.0)),
            ],
        )
        .await;
    controller
        .set_quote_behavior(AAPL, MockBehavior::Return(QuoteTick::price(101.0)))
        .await;

    let mut rx = rec.subscribe();
    rec.track_with_anchor(AAPL, 100.0).await.unwrap();

    let s1 = next_snapshot(&mut rx).await;
    assert!(s1.is_increasing);
    assert_eq!(s1.delta, 2.0);
    assert!((s1.delta_percent - 2.0).abs() < 1e-9);
    assert_eq!(s1.market_state, MarketState::Pre);

    let s2 = next_snapshot(&mut rx).await;
    assert!(!s2.is_increasing);
    assert_eq!(s2.delta, 1.0);
    assert_eq!(s2.symbol, AAPL);

    rec.disable().await;
    assert!(rec.current().snapshot.is_none());
}
