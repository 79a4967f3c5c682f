use std::sync::Arc;
use std::time::Duration;

use augur::{QuoteTick, Reconciler, TickOutcome};
use augur_core::QuoteSource;
use augur_mock::{DynamicMockSource, MockBehavior};

use crate::helpers::{AAPL, every_second, mock_reconciler, yield_until_requests};

#[tokio::test(start_paused = true)]
async fn manual_tick_is_skipped_while_loop_fetch_outstanding() {
    let (rec, controller) = mock_reconciler(every_second());
    controller
        .set_quote_behavior(
            AAPL,
            MockBehavior::Delay(Duration::from_secs(3), QuoteTick::price(190.0)),
        )
        .await;

    rec.track(AAPL).await.unwrap();
    yield_until_requests(&controller, 1).await;

    assert_eq!(rec.poll_once().await, Ok(TickOutcome::Busy));
    assert_eq!(controller.quote_requests().await.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn slow_fetches_never_overlap() {
    let (rec, controller) = mock_reconciler(every_second());
    // Each fetch takes longer than the poll period.
    controller
        .set_quote_behavior(
            AAPL,
            MockBehavior::Delay(Duration::from_millis(2_500), QuoteTick::price(190.0)),
        )
        .await;

    rec.track(AAPL).await.unwrap();
    tokio::time::sleep(Duration::from_secs(10)).await;

    // Ticks start at 0, 3.5, 7.0 (fetch 2.5s + period 1s); the 4th would start at 10.5.
    assert_eq!(controller.quote_requests().await.len(), 3);
}

#[tokio::test(start_paused = true)]
async fn dropping_last_handle_stops_polling() {
    let (mock, controller) = DynamicMockSource::new_with_controller("mock");
    controller
        .set_quote_behavior(AAPL, MockBehavior::Return(QuoteTick::price(1.0)))
        .await;
    let rec = Reconciler::builder()
        .source(mock as Arc<dyn QuoteSource>)
        .build()
        .unwrap();

    rec.track(AAPL).await.unwrap();
    tokio::time::sleep(Duration::from_millis(2_500)).await;
    let seen = controller.quote_requests().await.len();
    assert!(seen >= 3);

    drop(rec);
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(controller.quote_requests().await.len(), seen);
}

#[tokio::test(start_paused = true)]
async fn cancelled_manual_tick_does_not_wedge_polling() {
    let (rec, controller) = mock_reconciler(every_second());
    controller
        .set_quote_behavior(AAPL, MockBehavior::Return(QuoteTick::price(100.0)))
        .await;

    rec.track(AAPL).await.unwrap();
    yield_until_requests(&controller, 1).await;

    // Abandon a manual tick while its fetch is still outstanding.
    controller.set_quote_behavior(AAPL, MockBehavior::Hang).await;
    let abandoned = tokio::time::timeout(Duration::from_millis(100), rec.poll_once()).await;
    assert!(abandoned.is_err());
    assert_eq!(controller.quote_requests().await.len(), 2);

    controller
        .set_quote_behavior(AAPL, MockBehavior::Return(QuoteTick::price(200.0)))
        .await;
    tokio::time::sleep(Duration::from_millis(3_500)).await;

    assert!(controller.quote_requests().await.len() >= 5);
    assert_eq!(rec.current().snapshot.map(|s| s.price), Some(200.0));
    assert_ne!(rec.poll_once().await, Ok(TickOutcome::Busy));
}
