use proptest::prelude::*;

use augur::{QuoteTick, SessionState, TickOutcome};
use augur_mock::MockBehavior;

use crate::helpers::{AAPL, every_second, mock_reconciler, next_live};

#[derive(Clone, Debug)]
enum Tick {
    Price {
        price: f64,
        range: Option<(f64, f64)>,
    },
    Empty,
    ErrorBody,
}

fn arb_tick() -> impl Strategy<Value = Tick> {
    prop_oneof![
        4 => (1.0f64..500.0, proptest::option::of((0.5f64..1.0, 1.0f64..1.5)))
            .prop_map(|(price, r)| Tick::Price {
                price,
                range: r.map(|(lo, hi)| (price * lo, price * hi)),
            }),
        1 => Just(Tick::Empty),
        1 => Just(Tick::ErrorBody),
    ]
}

fn to_quote(t: &Tick) -> QuoteTick {
    match t {
        Tick::Price { price, range } => {
            let q = QuoteTick::price(*price);
            match range {
                Some((lo, hi)) => q.with_range(*lo, *hi),
                None => q,
            }
        }
        Tick::Empty => QuoteTick::default(),
        Tick::ErrorBody => QuoteTick::error("unavailable"),
    }
}

proptest! {
    #[test]
    fn state_direction_and_range_hold(ticks in proptest::collection::vec(arb_tick(), 1..60)) {
        let mut state = SessionState::new(AAPL);
        let now = chrono::Utc::now();
        let mut prev: Option<f64> = None;
        let (mut max_seen, mut min_seen) = (f64::MIN, f64::MAX);

        for t in &ticks {
            let before = state.snapshot().cloned();
            let outcome = state.record(Ok(to_quote(t)), "prop", now);
            match t {
                Tick::Price { price, .. } => {
                    prop_assert_eq!(outcome, TickOutcome::Applied);
                    let snap = state.snapshot().unwrap();
                    prop_assert_eq!(snap.is_increasing, prev.is_some_and(|p| *price > p));
                    max_seen = max_seen.max(*price);
                    min_seen = min_seen.min(*price);
                    prop_assert!(snap.day_high >= max_seen);
                    prop_assert!(snap.day_low <= min_seen);
                    if let Some(b) = &before {
                        prop_assert!(snap.day_high >= b.day_high);
                        prop_assert!(snap.day_low <= b.day_low);
                    }
                    prev = Some(*price);
                }
                Tick::Empty | Tick::ErrorBody => {
                    prop_assert_eq!(state.snapshot(), before.as_ref());
                }
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 24, .. ProptestConfig::default() })]
    #[test]
    fn polled_range_covers_every_price(ticks in proptest::collection::vec(arb_tick(), 1..12)) {
        tokio_test::block_on(async move {
            // Control time deterministically for the poll period
            tokio::time::pause();

            let (rec, controller) = mock_reconciler(every_second());
            controller
                .script_quotes(AAPL, ticks.iter().map(|t| MockBehavior::Return(to_quote(t))))
                .await;
            controller
                .set_quote_behavior(AAPL, MockBehavior::Return(QuoteTick::default()))
                .await;

            let mut rx = rec.subscribe();
            rec.track(AAPL).await.unwrap();
            // Reset publish, then one publish per scripted tick.
            next_live(&mut rx).await;
            let mut last = None;
            for _ in &ticks {
                last = Some(next_live(&mut rx).await);
            }
            rec.shutdown().await;

            let prices: Vec<f64> = ticks
                .iter()
                .filter_map(|t| match t {
                    Tick::Price { price, .. } => Some(*price),
                    _ => None,
                })
                .collect();
            let snapshot = last.and_then(|l| l.snapshot);
            match snapshot {
                None => assert!(prices.is_empty()),
                Some(s) => {
                    let hi = prices.iter().copied().fold(f64::MIN, f64::max);
                    let lo = prices.iter().copied().fold(f64::MAX, f64::min);
                    assert!(s.day_high >= hi);
                    assert!(s.day_low <= lo);
                    assert_eq!(Some(&s.price), prices.last());
                }
            }
        });
    }
}
