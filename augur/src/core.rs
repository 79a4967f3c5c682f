use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use augur_core::{
    AugurError, BackoffConfig, LiveQuote, PollHandle, QuoteSource, ReconcilerConfig,
};
use tokio::sync::{Mutex, watch};

use crate::reconcile::state::SessionState;

/// Live quote reconciler: polls one symbol at a time and publishes a
/// consistent [`LiveQuote`] view.
///
/// Cloning is cheap; clones share the same session and poll loop.
#[derive(Clone)]
pub struct Reconciler {
    pub(crate) inner: Arc<Inner>,
}

pub(crate) struct Inner {
    pub(crate) source: Arc<dyn QuoteSource>,
    pub(crate) cfg: ReconcilerConfig,
    pub(crate) board: Mutex<Board>,
    /// Session whose fetch is outstanding; 0 when idle.
    pub(crate) in_flight: AtomicU64,
    pub(crate) tx: watch::Sender<LiveQuote>,
    // Held across a whole session switch so switches are serialized.
    pub(crate) poller: Mutex<Option<PollHandle>>,
}

/// Mutable session bookkeeping guarded by one lock.
#[derive(Default)]
pub(crate) struct Board {
    pub(crate) session_id: u64,
    pub(crate) state: Option<SessionState>,
}

/// Claim on the in-flight slot for one session.
///
/// Released on drop, so a tick cancelled mid-fetch never leaves its
/// session marked busy. A newer session's claim is left untouched.
pub(crate) struct InFlight<'a> {
    slot: &'a AtomicU64,
    session: u64,
}

impl<'a> InFlight<'a> {
    /// Claim `slot` for `session`, or `None` if that session already holds it.
    pub(crate) fn claim(slot: &'a AtomicU64, session: u64) -> Option<Self> {
        let prev = slot.swap(session, Ordering::AcqRel);
        if prev == session {
            return None;
        }
        Some(Self { slot, session })
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let _ = self
            .slot
            .compare_exchange(self.session, 0, Ordering::AcqRel, Ordering::Acquire);
    }
}

/// Builder for constructing a [`Reconciler`] with custom configuration.
pub struct ReconcilerBuilder {
    source: Option<Arc<dyn QuoteSource>>,
    cfg: ReconcilerConfig,
}

impl Default for ReconcilerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReconcilerBuilder {
    /// Create a new builder with default configuration and no source.
    #[must_use]
    pub fn new() -> Self {
        Self {
            source: None,
            cfg: ReconcilerConfig::default(),
        }
    }

    /// Set the quote source to poll. Required.
    #[must_use]
    pub fn source(mut self, source: Arc<dyn QuoteSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Replace the whole configuration.
    #[must_use]
    pub fn config(mut self, cfg: ReconcilerConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Set the fixed period between ticks.
    ///
    /// Behavior and trade-offs:
    /// - Shorter periods surface price moves sooner but multiply request volume.
    /// - The period is measured from the end of one tick to the start of the next,
    ///   so a slow fetch delays the following tick instead of overlapping it.
    #[must_use]
    pub const fn poll_interval(mut self, every: Duration) -> Self {
        self.cfg.poll_interval = every;
        self
    }

    /// Set the per-fetch timeout. An expired fetch counts as a failed tick.
    #[must_use]
    pub const fn fetch_timeout(mut self, timeout: Duration) -> Self {
        self.cfg.fetch_timeout = timeout;
        self
    }

    /// Number of consecutive failed ticks after which the feed is flagged degraded.
    #[must_use]
    pub const fn degraded_after(mut self, failures: u32) -> Self {
        self.cfg.degraded_after = failures;
        self
    }

    /// Back off the poll period while degraded.
    ///
    /// Behavior and trade-offs:
    /// - Reduces load on a struggling endpoint at the cost of noticing recovery later.
    /// - Jitter keeps many reconcilers from retrying in lockstep.
    #[must_use]
    pub const fn backoff(mut self, cfg: BackoffConfig) -> Self {
        self.cfg.backoff = Some(cfg);
        self
    }

    /// Build the reconciler. No polling starts until [`Reconciler::track`].
    ///
    /// # Errors
    /// Returns `InvalidArg` if no source was set or the configuration is invalid.
    pub fn build(self) -> Result<Reconciler, AugurError> {
        let source = self.source.ok_or_else(|| {
            AugurError::InvalidArg("no quote source set; add one via source(...)".to_string())
        })?;
        self.cfg.validate()?;
        let (tx, _rx) = watch::channel(LiveQuote::default());
        Ok(Reconciler {
            inner: Arc::new(Inner {
                source,
                cfg: self.cfg,
                board: Mutex::new(Board::default()),
                in_flight: AtomicU64::new(0),
                tx,
                poller: Mutex::new(None),
            }),
        })
    }
}

impl Reconciler {
    /// Start building a new `Reconciler`.
    ///
    /// ```rust,ignore
    /// use std::sync::Arc;
    /// use std::time::Duration;
    ///
    /// let rec = augur::Reconciler::builder()
    ///     .source(Arc::new(HttpQuoteSource::new("http://localhost:8000")?))
    ///     .poll_interval(Duration::from_secs(2))
    ///     .build()?;
    /// rec.track("AAPL").await?;
    /// let mut rx = rec.subscribe();
    /// ```
    #[must_use]
    pub fn builder() -> ReconcilerBuilder {
        ReconcilerBuilder::new()
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &ReconcilerConfig {
        &self.inner.cfg
    }
}

impl Inner {
    /// Wrap a source future with the fetch timeout and standardized timeout error mapping.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "augur::core::fetch_with_timeout",
            skip(self),
            fields(
                source = self.source.name(),
                timeout_ms = u64::try_from(self.cfg.fetch_timeout.as_millis()).unwrap_or(u64::MAX),
            ),
        )
    )]
    pub(crate) async fn fetch_with_timeout(
        &self,
        symbol: &str,
    ) -> Result<augur_core::QuoteTick, AugurError> {
        let timeout = self.cfg.fetch_timeout;
        (tokio::time::timeout(timeout, self.source.fetch_quote(symbol)).await).unwrap_or_else(|_| {
            Err(AugurError::source_timeout(
                self.source.name(),
                u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            ))
        })
    }
}
