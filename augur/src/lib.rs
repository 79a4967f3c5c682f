//! Augur keeps a live quote consistent under polling and fuses forecasts for charting.
//!
//! Overview
//! - `Reconciler` polls a `QuoteSource` for one symbol at a time and publishes a
//!   `LiveQuote` (snapshot, degraded flag, last error) over a tokio `watch` channel.
//! - `fuse` aligns historical prices, short-horizon forecasts and long-horizon
//!   ensemble/hybrid payloads on one ordinal axis; `augur_core::payload` turns
//!   upstream forecast responses into its inputs.
//!
//! Key behaviors and trade-offs
//! - Direction vs. delta: `is_increasing` compares against the previous tick,
//!   `delta` against the session anchor. They deliberately differ.
//! - Failed or empty ticks keep the last good snapshot. After `degraded_after`
//!   consecutive failures the view is flagged `degraded`; an optional backoff
//!   stretches the period while degraded, with jitter to avoid lockstep retries.
//! - Session switches: ticks that resolve after `track`/`disable` replaced their
//!   session are discarded, never applied.
//! - One fetch per session in flight: the loop ticks serially and `poll_once`
//!   reports `TickOutcome::Busy` instead of queueing.
//!
//! Examples
//! Tracking a symbol and reading updates:
//! ```rust,ignore
//! use std::sync::Arc;
//! use augur::Reconciler;
//!
//! let rec = Reconciler::builder()
//!     .source(Arc::new(HttpQuoteSource::new("http://localhost:8000")?))
//!     .build()?;
//! rec.track("AAPL").await?;
//! let mut rx = rec.subscribe();
//! while rx.changed().await.is_ok() {
//!     if let Some(snap) = rx.borrow().snapshot.as_ref() {
//!         println!("{} {:.2} ({:+.2})", snap.symbol, snap.price, snap.delta);
//!     }
//! }
//! ```
//!
//! Fusing an ensemble response:
//! ```rust,ignore
//! use augur::payload::{chart_entries, from_ensemble};
//!
//! let resp = augur::payload::parse_ensemble(&body)?;
//! let fused = augur::fuse(&chart_entries(&resp), &from_ensemble(&resp).payloads, 190.0);
//! let in_five_days = fused.summary(5);
//! ```
//!
//! See `augur/examples/` for runnable end-to-end demonstrations.
#![warn(missing_docs)]

pub(crate) mod core;
/// Live quote reconciliation: tick state and degraded-mode backoff.
pub mod reconcile;

pub use core::{Reconciler, ReconcilerBuilder};
pub use reconcile::state::{SessionState, TickOutcome};

pub use augur_core::{ForecastSource, PollHandle, QuoteSource, fuse, fuse_with, payload};

// Re-export core types for convenience
pub use augur_core::{
    AugurError, BackoffConfig, BaseEntry, EnsembleWeights, EntryKind, ForecastPayload,
    FusedSeries, FusionConfig, HorizonSlot, HorizonSummary, HybridAdjustment, LiveQuote,
    MarketState, QuoteSnapshot, QuoteTick, ReconcilerConfig, SeriesPoint, Zone,
};
