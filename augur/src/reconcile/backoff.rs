//! Poll delays while the feed is degraded: exponential backoff plus jitter.

use std::time::Duration;

use augur_core::{BackoffConfig, LiveQuote, ReconcilerConfig};
use rand::Rng;

/// `base_ms` plus a random extra of up to `jitter_percent` percent of it.
///
/// A zero percent returns `base_ms` unchanged.
#[must_use]
pub fn jitter_wait(base_ms: u64, jitter_percent: u32) -> u64 {
    let jitter_range = if jitter_percent == 0 {
        1
    } else {
        std::cmp::max(1, (base_ms.saturating_mul(u64::from(jitter_percent))) / 100)
    };
    let mut rng = rand::rng();
    base_ms + rng.random_range(0..jitter_range)
}

/// Backoff before jitter after `steps` failures past the degraded threshold.
#[must_use]
pub fn base_delay_ms(b: &BackoffConfig, steps: u32) -> u64 {
    let factor = u64::from(b.factor.max(1));
    let mut delay = b.min_backoff_ms;
    for _ in 0..steps {
        if delay >= b.max_backoff_ms {
            break;
        }
        delay = delay.saturating_mul(factor);
    }
    delay.min(b.max_backoff_ms)
}

/// Wait before the next tick given the latest published state.
///
/// The period is fixed unless the feed is degraded and a backoff is configured.
#[must_use]
pub fn next_delay(cfg: &ReconcilerConfig, live: &LiveQuote) -> Duration {
    match (&cfg.backoff, live.degraded) {
        (Some(b), true) => {
            let steps = live.consecutive_failures.saturating_sub(cfg.degraded_after);
            let base = base_delay_ms(b, steps);
            Duration::from_millis(jitter_wait(base, u32::from(b.jitter_percent.min(100))))
        }
        _ => cfg.poll_interval,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backoff(jitter: u8) -> BackoffConfig {
        BackoffConfig {
            min_backoff_ms: 1_000,
            max_backoff_ms: 10_000,
            factor: 3,
            jitter_percent: jitter,
        }
    }

    #[test]
    fn base_delay_grows_and_caps() {
        let b = backoff(0);
        assert_eq!(base_delay_ms(&b, 0), 1_000);
        assert_eq!(base_delay_ms(&b, 1), 3_000);
        assert_eq!(base_delay_ms(&b, 2), 9_000);
        assert_eq!(base_delay_ms(&b, 3), 10_000);
        assert_eq!(base_delay_ms(&b, u32::MAX), 10_000);
    }

    #[test]
    fn jitter_stays_within_percent() {
        for _ in 0..200 {
            let w = jitter_wait(1_000, 20);
            assert!((1_000..1_200).contains(&w));
        }
        assert_eq!(jitter_wait(1_000, 0), 1_000);
    }

    #[test]
    fn healthy_feed_keeps_fixed_period() {
        let cfg = ReconcilerConfig {
            backoff: Some(backoff(0)),
            ..ReconcilerConfig::default()
        };
        let live = LiveQuote {
            consecutive_failures: 2,
            ..LiveQuote::default()
        };
        assert_eq!(next_delay(&cfg, &live), cfg.poll_interval);
    }

    #[test]
    fn degraded_feed_backs_off_only_when_configured() {
        let live = LiveQuote {
            degraded: true,
            consecutive_failures: 4,
            ..LiveQuote::default()
        };
        let plain = ReconcilerConfig::default();
        assert_eq!(next_delay(&plain, &live), plain.poll_interval);

        let cfg = ReconcilerConfig {
            backoff: Some(backoff(0)),
            ..ReconcilerConfig::default()
        };
        assert_eq!(next_delay(&cfg, &live), Duration::from_millis(3_000));
    }
}
