use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use augur::{AugurError, BackoffConfig, QuoteTick, Reconciler};
use augur_core::QuoteSource;

use crate::helpers::{AAPL, next_live};

struct CountingFailSource {
    attempts: Arc<AtomicUsize>,
    events: Arc<Mutex<Vec<tokio::time::Instant>>>,
}

#[async_trait]
impl QuoteSource for CountingFailSource {
    fn name(&self) -> &'static str {
        "counting_fail"
    }

    async fn fetch_quote(&self, _symbol: &str) -> Result<QuoteTick, AugurError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut events) = self.events.lock() {
            events.push(tokio::time::Instant::now());
        }
        Err(AugurError::quote_fetch("counting_fail", "start failed"))
    }
}

fn gaps_ms(events: &[tokio::time::Instant]) -> Vec<u128> {
    events
        .windows(2)
        .map(|w| (w[1] - w[0]).as_millis())
        .collect()
}

#[tokio::test(start_paused = true)]
async fn degraded_backoff_exponential_no_jitter() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let events = Arc::new(Mutex::new(Vec::new()));
    let source = Arc::new(CountingFailSource {
        attempts: attempts.clone(),
        events: events.clone(),
    });

    let rec = Reconciler::builder()
        .source(source)
        .poll_interval(Duration::from_secs(1))
        .degraded_after(2)
        .backoff(BackoffConfig {
            min_backoff_ms: 2_000,
            max_backoff_ms: 8_000,
            factor: 2,
            jitter_percent: 0,
        })
        .build()
        .unwrap();

    let mut rx = rec.subscribe();
    rec.track(AAPL).await.unwrap();
    while attempts.load(Ordering::SeqCst) < 6 {
        next_live(&mut rx).await;
    }
    rec.shutdown().await;

    let events = events.lock().unwrap().clone();
    // Healthy period until the 2nd failure, then 2s, 4s, 8s, capped at 8s.
    assert_eq!(gaps_ms(&events[..6]), vec![1_000, 2_000, 4_000, 8_000, 8_000]);
}

#[tokio::test(start_paused = true)]
async fn without_backoff_period_stays_fixed_while_degraded() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let events = Arc::new(Mutex::new(Vec::new()));
    let source = Arc::new(CountingFailSource {
        attempts: attempts.clone(),
        events: events.clone(),
    });

    let rec = Reconciler::builder()
        .source(source)
        .poll_interval(Duration::from_millis(500))
        .build()
        .unwrap();

    let mut rx = rec.subscribe();
    rec.track(AAPL).await.unwrap();
    let last = loop {
        let live = next_live(&mut rx).await;
        if attempts.load(Ordering::SeqCst) >= 5 {
            break live;
        }
    };
    assert!(last.degraded);
    rec.shutdown().await;

    let events = events.lock().unwrap().clone();
    assert!(gaps_ms(&events[..5]).iter().all(|g| *g == 500));
}
