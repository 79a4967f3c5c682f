mod common;

use std::time::Duration;

use augur::Reconciler;
use common::{get_source, init_tracing};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    // 1. Build a reconciler over the configured source (mock in CI).
    let rec = Reconciler::builder()
        .source(get_source())
        .poll_interval(Duration::from_millis(500))
        .degraded_after(3)
        .build()?;

    // 2. Start a session; the first tick fires immediately.
    rec.track("AAPL").await?;
    let mut rx = rec.subscribe();

    // 3. Print a handful of reconciled views.
    for _ in 0..5 {
        rx.changed().await?;
        let live = rx.borrow_and_update().clone();
        match live.snapshot {
            Some(s) => println!(
                "{} {:.2} {} delta {:+.2} ({:+.2}%) range {:.2}-{:.2} [{}]{}",
                s.symbol,
                s.price,
                if s.is_increasing { "▲" } else { "▼" },
                s.delta,
                s.delta_percent,
                s.day_low,
                s.day_high,
                s.market_state,
                if live.degraded { " (degraded)" } else { "" },
            ),
            None => println!("waiting for first quote ({} failures)", live.consecutive_failures),
        }
    }

    // 4. Stop polling.
    rec.shutdown().await;
    Ok(())
}
