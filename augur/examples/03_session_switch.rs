mod common;

use std::time::Duration;

use augur::{Reconciler, TickOutcome};
use common::{get_source, init_tracing};
use futures::future::join_all;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let rec = Reconciler::builder()
        .source(get_source())
        .poll_interval(Duration::from_secs(1))
        .build()?;

    // 1. Track one symbol, then switch; the old session's ticks are dropped.
    rec.track("AAPL").await?;
    tokio::time::sleep(Duration::from_millis(300)).await;
    println!("tracking {:?}", rec.current().symbol);

    rec.track_with_anchor("MSFT", 400.0).await?;
    tokio::time::sleep(Duration::from_millis(300)).await;
    let live = rec.current();
    if let Some(s) = live.snapshot {
        println!(
            "session {} {} {:.2}, {:+.2} vs anchor {:.2}",
            live.session, s.symbol, s.price, s.delta, s.anchor_price
        );
    }

    // 2. Manual ticks share the in-flight guard with the loop.
    match rec.poll_once().await {
        Ok(TickOutcome::Busy) => println!("a tick was already in flight"),
        Ok(outcome) => println!("manual tick: {outcome:?}"),
        Err(e) => println!("manual tick discarded: {e}"),
    }

    // 3. A watch list is just one reconciler per symbol.
    let symbols = ["NVDA", "GOOGL", "KO"];
    let mut watch = Vec::new();
    for s in symbols {
        let r = Reconciler::builder().source(get_source()).build()?;
        r.track(s).await?;
        watch.push(r);
    }
    let firsts = join_all(watch.iter().map(|r| async move {
        let mut rx = r.subscribe();
        while rx.borrow_and_update().snapshot.is_none() {
            if rx.changed().await.is_err() {
                break;
            }
        }
        r.current()
    }))
    .await;
    for live in firsts {
        if let Some(s) = live.snapshot {
            println!("{:>6} {:>9.2} [{}]", s.symbol, s.price, s.market_state);
        }
    }

    // 4. Disabling drops anything still in flight.
    rec.disable().await;
    println!("after disable: {:?}", rec.current().symbol);
    for r in watch {
        r.shutdown().await;
    }
    rec.shutdown().await;
    Ok(())
}
