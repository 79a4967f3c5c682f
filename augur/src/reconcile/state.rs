//! Pure per-session tick state.
//!
//! Everything here is synchronous and clock-free; the poll loop feeds fetch
//! results in and publishes the resulting [`LiveQuote`].

use chrono::{DateTime, Utc};

use augur_core::{AugurError, LiveQuote, MarketState, QuoteSnapshot, QuoteTick};

/// What a single tick did to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// A price was observed and the snapshot updated.
    Applied,
    /// The body carried neither a price nor an error; nothing changed.
    NoPrice,
    /// The fetch failed or the body reported an error; the snapshot was kept.
    Failed,
    /// Another fetch for this session was still outstanding; no fetch was issued.
    Busy,
}

/// Reconciliation state for one tracked symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    symbol: String,
    anchor: Option<f64>,
    reference: Option<f64>,
    snapshot: Option<QuoteSnapshot>,
    consecutive_failures: u32,
    last_error: Option<AugurError>,
}

impl SessionState {
    /// Fresh session; the first observed price becomes the anchor.
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            anchor: None,
            reference: None,
            snapshot: None,
            consecutive_failures: 0,
            last_error: None,
        }
    }

    /// Fresh session anchored on a known price, e.g. the previous close.
    ///
    /// The anchor is also the reference for the first direction comparison.
    pub fn with_anchor(symbol: impl Into<String>, anchor: f64) -> Self {
        let mut s = Self::new(symbol);
        if anchor.is_finite() {
            s.anchor = Some(anchor);
            s.reference = Some(anchor);
        }
        s
    }

    /// Tracked symbol.
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Last good snapshot, if any price has been observed.
    #[must_use]
    pub const fn snapshot(&self) -> Option<&QuoteSnapshot> {
        self.snapshot.as_ref()
    }

    /// Failed ticks since the last applied one.
    #[must_use]
    pub const fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// `true` once `threshold` consecutive ticks have failed.
    #[must_use]
    pub const fn is_degraded(&self, threshold: u32) -> bool {
        self.consecutive_failures >= threshold
    }

    /// Fold one fetch result into the session.
    ///
    /// `source_name` tags in-band error bodies. `now` stamps the snapshot when
    /// the source omits a timestamp.
    pub fn record(
        &mut self,
        fetched: Result<QuoteTick, AugurError>,
        source_name: &str,
        now: DateTime<Utc>,
    ) -> TickOutcome {
        match fetched {
            Ok(tick) => {
                if let Some(msg) = tick.error {
                    return self.fail(AugurError::quote_fetch(source_name, msg));
                }
                self.apply(&tick, now)
            }
            Err(e) => self.fail(e),
        }
    }

    fn fail(&mut self, err: AugurError) -> TickOutcome {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.last_error = Some(err);
        TickOutcome::Failed
    }

    fn apply(&mut self, tick: &QuoteTick, now: DateTime<Utc>) -> TickOutcome {
        let Some(price) = tick.price.filter(|p| p.is_finite()) else {
            return TickOutcome::NoPrice;
        };

        let anchor = *self.anchor.get_or_insert(price);
        // Direction compares against the value stored before this tick.
        let previous = self.reference.unwrap_or(price);
        let is_increasing = price > previous;
        self.reference = Some(price);

        let prev = self.snapshot.as_ref();
        let day_high = [prev.map(|s| s.day_high), tick.day_high]
            .into_iter()
            .flatten()
            .filter(|v| v.is_finite())
            .fold(price, f64::max);
        let day_low = [prev.map(|s| s.day_low), tick.day_low]
            .into_iter()
            .flatten()
            .filter(|v| v.is_finite())
            .fold(price, f64::min);

        let delta = price - anchor;
        let delta_percent = if anchor == 0.0 {
            0.0
        } else {
            delta / anchor * 100.0
        };

        self.snapshot = Some(QuoteSnapshot {
            symbol: self.symbol.clone(),
            price,
            previous_reference_price: previous,
            anchor_price: anchor,
            delta,
            delta_percent,
            is_increasing,
            volume: tick.volume.or_else(|| prev.and_then(|s| s.volume)),
            day_high,
            day_low,
            market_state: tick
                .market_state
                .or_else(|| prev.map(|s| s.market_state))
                .unwrap_or(MarketState::Unknown),
            as_of: tick.timestamp.unwrap_or(now),
        });
        self.consecutive_failures = 0;
        self.last_error = None;
        TickOutcome::Applied
    }

    /// Public view of this session.
    #[must_use]
    pub fn to_live(&self, session: u64, degraded_after: u32) -> LiveQuote {
        LiveQuote {
            session,
            symbol: Some(self.symbol.clone()),
            snapshot: self.snapshot.clone(),
            degraded: self.is_degraded(degraded_after),
            consecutive_failures: self.consecutive_failures,
            last_error: self.last_error.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn feed(s: &mut SessionState, tick: QuoteTick) -> TickOutcome {
        s.record(Ok(tick), "test", now())
    }

    #[test]
    fn first_tick_sets_anchor_and_reference() {
        let mut s = SessionState::new("AAPL");
        assert_eq!(feed(&mut s, QuoteTick::price(100.0)), TickOutcome::Applied);
        let snap = s.snapshot().unwrap();
        assert_eq!(snap.anchor_price, 100.0);
        assert_eq!(snap.previous_reference_price, 100.0);
        assert_eq!(snap.delta, 0.0);
        assert!(!snap.is_increasing);
        assert_eq!(snap.day_high, 100.0);
        assert_eq!(snap.day_low, 100.0);
        assert_eq!(snap.as_of, now());
    }

    #[test]
    fn direction_uses_pre_tick_reference_and_delta_uses_anchor() {
        let mut s = SessionState::new("AAPL");
        feed(&mut s, QuoteTick::price(100.0));
        feed(&mut s, QuoteTick::price(101.0));
        let snap = s.snapshot().unwrap();
        assert!(snap.is_increasing);
        assert_eq!(snap.previous_reference_price, 100.0);

        feed(&mut s, QuoteTick::price(100.5));
        let snap = s.snapshot().unwrap();
        assert!(!snap.is_increasing);
        assert_eq!(snap.previous_reference_price, 101.0);
        assert!((snap.delta - 0.5).abs() < 1e-12);
        assert!((snap.delta_percent - 0.5).abs() < 1e-12);
    }

    #[test]
    fn explicit_anchor_is_first_reference() {
        let mut s = SessionState::with_anchor("MSFT", 400.0);
        feed(&mut s, QuoteTick::price(404.0));
        let snap = s.snapshot().unwrap();
        assert!(snap.is_increasing);
        assert_eq!(snap.delta, 4.0);
        assert!((snap.delta_percent - 1.0).abs() < 1e-12);
    }

    #[test]
    fn reported_range_widens_and_never_shrinks() {
        let mut s = SessionState::new("X");
        feed(&mut s, QuoteTick::price(10.0).with_range(9.0, 12.0));
        feed(&mut s, QuoteTick::price(11.0).with_range(10.5, 11.5));
        let snap = s.snapshot().unwrap();
        assert_eq!(snap.day_low, 9.0);
        assert_eq!(snap.day_high, 12.0);
        feed(&mut s, QuoteTick::price(13.0));
        assert_eq!(s.snapshot().unwrap().day_high, 13.0);
    }

    #[test]
    fn error_body_counts_as_failure_and_keeps_snapshot() {
        let mut s = SessionState::new("X");
        feed(&mut s, QuoteTick::price(10.0));
        assert_eq!(feed(&mut s, QuoteTick::error("boom")), TickOutcome::Failed);
        assert_eq!(s.consecutive_failures(), 1);
        assert_eq!(s.snapshot().unwrap().price, 10.0);
        let live = s.to_live(1, 3);
        assert!(matches!(
            live.last_error,
            Some(AugurError::QuoteFetch { ref msg, .. }) if msg == "boom"
        ));
    }

    #[test]
    fn empty_body_is_a_no_op() {
        let mut s = SessionState::new("X");
        s.record(Err(AugurError::Other("net".into())), "test", now());
        assert_eq!(feed(&mut s, QuoteTick::default()), TickOutcome::NoPrice);
        assert_eq!(s.consecutive_failures(), 1);
        assert!(s.snapshot().is_none());
    }

    #[test]
    fn degraded_after_threshold_then_recovers() {
        let mut s = SessionState::new("X");
        for _ in 0..3 {
            s.record(Err(AugurError::quote_fetch("test", "down")), "test", now());
        }
        assert!(s.is_degraded(3));
        feed(&mut s, QuoteTick::price(1.0));
        assert!(!s.is_degraded(3));
        assert!(s.to_live(7, 3).last_error.is_none());
    }

    #[test]
    fn missing_fields_fall_back_to_previous_snapshot() {
        let mut s = SessionState::new("X");
        let mut first = QuoteTick::price(5.0);
        first.volume = Some(1_000);
        first.market_state = Some(MarketState::Regular);
        feed(&mut s, first);
        feed(&mut s, QuoteTick::price(5.5));
        let snap = s.snapshot().unwrap();
        assert_eq!(snap.volume, Some(1_000));
        assert_eq!(snap.market_state, MarketState::Regular);
    }
}
