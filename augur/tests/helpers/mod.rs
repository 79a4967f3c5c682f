use std::sync::Arc;
use std::time::Duration;

use augur::{LiveQuote, QuoteSnapshot, Reconciler, ReconcilerConfig};
use augur_core::QuoteSource;
use augur_mock::{DynamicMockController, DynamicMockSource};
use tokio::sync::watch;

// ---------- Lightweight fixtures and helpers for tests ----------

/// Common symbol constants used across tests.
pub const AAPL: &str = "AAPL";
pub const MSFT: &str = "MSFT";

/// Reconciler over a fresh dynamic mock polling every second.
pub fn mock_reconciler(cfg: ReconcilerConfig) -> (Reconciler, DynamicMockController) {
    let (mock, controller) = DynamicMockSource::new_with_controller("mock");
    let rec = Reconciler::builder()
        .source(mock as Arc<dyn QuoteSource>)
        .config(cfg)
        .build()
        .expect("valid reconciler config");
    (rec, controller)
}

pub fn every_second() -> ReconcilerConfig {
    ReconcilerConfig {
        poll_interval: Duration::from_secs(1),
        ..ReconcilerConfig::default()
    }
}

/// Wait for the next published view.
pub async fn next_live(rx: &mut watch::Receiver<LiveQuote>) -> LiveQuote {
    rx.changed().await.expect("reconciler dropped");
    rx.borrow_and_update().clone()
}

/// Wait for the next published view that carries a snapshot.
pub async fn next_snapshot(rx: &mut watch::Receiver<LiveQuote>) -> QuoteSnapshot {
    loop {
        if let Some(s) = next_live(rx).await.snapshot {
            return s;
        }
    }
}

/// Yield to other tasks until `n` quote requests were logged.
#[allow(dead_code)]
pub async fn yield_until_requests(controller: &DynamicMockController, n: usize) {
    for _ in 0..100 {
        if controller.quote_requests().await.len() >= n {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("expected {n} quote requests");
}
