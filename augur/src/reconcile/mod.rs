/// Degraded-mode backoff and jitter.
pub mod backoff;
/// Pure per-session tick state.
pub mod state;

use std::sync::atomic::Ordering;
use std::sync::{Arc, Weak};

use augur_core::{AugurError, LiveQuote, PollHandle};
use tokio::sync::{oneshot, watch};

use crate::core::{Board, InFlight, Inner};
use crate::{Reconciler, TickOutcome};
use state::SessionState;

impl Reconciler {
    /// Start live polling for `symbol`, replacing any current session.
    ///
    /// The previous session's loop is stopped and any of its outstanding
    /// ticks are discarded when they resolve. The first tick fires immediately.
    ///
    /// # Errors
    /// Returns `InvalidArg` if `symbol` is empty.
    pub async fn track(&self, symbol: &str) -> Result<(), AugurError> {
        self.start_session(symbol, None).await
    }

    /// Like [`track`](Self::track), but measures `delta` from `anchor` (e.g.
    /// the previous close) instead of the first observed price.
    ///
    /// # Errors
    /// Returns `InvalidArg` if `symbol` is empty or `anchor` is not finite.
    pub async fn track_with_anchor(&self, symbol: &str, anchor: f64) -> Result<(), AugurError> {
        if !anchor.is_finite() {
            return Err(AugurError::InvalidArg(format!(
                "anchor must be a finite price, got {anchor}"
            )));
        }
        self.start_session(symbol, Some(anchor)).await
    }

    async fn start_session(&self, symbol: &str, anchor: Option<f64>) -> Result<(), AugurError> {
        let symbol = symbol.trim();
        if symbol.is_empty() {
            return Err(AugurError::InvalidArg("symbol cannot be empty".into()));
        }
        let state = match anchor {
            Some(a) => SessionState::with_anchor(symbol, a),
            None => SessionState::new(symbol),
        };

        let mut poller = self.inner.poller.lock().await;
        let session = {
            let mut board = self.inner.board.lock().await;
            let session = Self::reset(&self.inner, &mut board, Some(state));
            #[cfg(feature = "tracing")]
            tracing::info!(symbol, session, "live session started");
            session
        };
        if let Some(old) = poller.take() {
            old.stop().await;
        }
        *poller = Some(Self::spawn_poll_loop(&self.inner, session));
        Ok(())
    }

    /// Stop live polling and clear the snapshot.
    ///
    /// Outstanding ticks are discarded when they resolve.
    pub async fn disable(&self) {
        let mut poller = self.inner.poller.lock().await;
        {
            let mut board = self.inner.board.lock().await;
            let _session = Self::reset(&self.inner, &mut board, None);
            #[cfg(feature = "tracing")]
            tracing::debug!(session = _session, "live session disabled");
        }
        if let Some(old) = poller.take() {
            old.stop().await;
        }
    }

    /// Stop polling and wait for the loop to exit.
    ///
    /// Other clones observe a disabled reconciler afterwards.
    pub async fn shutdown(self) {
        self.disable().await;
    }

    /// Receiver that observes every published [`LiveQuote`].
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<LiveQuote> {
        self.inner.tx.subscribe()
    }

    /// Latest published view.
    #[must_use]
    pub fn current(&self) -> LiveQuote {
        self.inner.tx.borrow().clone()
    }

    /// Run one tick for the current session outside the timer.
    ///
    /// Shares the in-flight limit and the session guard with the poll loop.
    ///
    /// # Errors
    /// Returns `NoActiveSession` when nothing is tracked, or `StaleSession` if
    /// the session changed while the fetch was outstanding.
    pub async fn poll_once(&self) -> Result<TickOutcome, AugurError> {
        let session = self.inner.board.lock().await.session_id;
        Self::tick(&self.inner, session).await
    }

    fn reset(inner: &Inner, board: &mut Board, state: Option<SessionState>) -> u64 {
        board.session_id = board.session_id.wrapping_add(1);
        inner.in_flight.store(0, Ordering::Release);
        let live = match &state {
            Some(s) => s.to_live(board.session_id, inner.cfg.degraded_after),
            None => LiveQuote {
                session: board.session_id,
                ..LiveQuote::default()
            },
        };
        board.state = state;
        inner.tx.send_replace(live);
        board.session_id
    }

    /// One guarded tick for `session`.
    ///
    /// The relevance check runs again after the fetch resolves, under the same
    /// lock that applies the mutation, so a stale result is never observed.
    ///
    /// The in-flight claim is released on every exit path, including when the
    /// returned future is dropped mid-fetch.
    pub(crate) async fn tick(inner: &Inner, session: u64) -> Result<TickOutcome, AugurError> {
        let (symbol, claim) = {
            let board = inner.board.lock().await;
            if board.session_id != session {
                return Err(AugurError::NoActiveSession);
            }
            let Some(state) = board.state.as_ref() else {
                return Err(AugurError::NoActiveSession);
            };
            let Some(claim) = InFlight::claim(&inner.in_flight, session) else {
                return Ok(TickOutcome::Busy);
            };
            (state.symbol().to_string(), claim)
        };

        let fetched = inner.fetch_with_timeout(&symbol).await;

        let mut board = inner.board.lock().await;
        drop(claim);
        if board.session_id != session {
            #[cfg(feature = "tracing")]
            tracing::debug!(symbol = %symbol, session, "discarding tick for replaced session");
            return Err(AugurError::StaleSession { symbol });
        }
        let threshold = inner.cfg.degraded_after;
        let Some(state) = board.state.as_mut() else {
            return Err(AugurError::NoActiveSession);
        };

        let was_degraded = state.is_degraded(threshold);
        let outcome = state.record(fetched, inner.source.name(), chrono::Utc::now());
        let live = state.to_live(session, threshold);

        #[cfg(feature = "tracing")]
        match outcome {
            TickOutcome::Failed => {
                if let Some(e) = &live.last_error {
                    tracing::warn!(symbol = %symbol, failures = live.consecutive_failures, error = %e, "quote tick failed");
                }
                if live.degraded && !was_degraded {
                    tracing::warn!(symbol = %symbol, failures = live.consecutive_failures, "live quote degraded");
                }
            }
            TickOutcome::NoPrice => {
                tracing::debug!(symbol = %symbol, "quote tick carried no price; keeping snapshot");
            }
            TickOutcome::Applied if was_degraded => {
                tracing::info!(symbol = %symbol, "live quote recovered");
            }
            _ => {}
        }
        #[cfg(not(feature = "tracing"))]
        let _ = was_degraded;

        inner.tx.send_replace(live);
        Ok(outcome)
    }

    fn spawn_poll_loop(inner: &Arc<Inner>, session: u64) -> PollHandle {
        // The loop must not keep the reconciler alive; dropping the last
        // clone drops the handle, which aborts the loop.
        let weak: Weak<Inner> = Arc::downgrade(inner);
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
        let join = tokio::spawn(async move {
            loop {
                let Some(inner) = weak.upgrade() else { return };
                let res = tokio::select! {
                    biased;
                    _ = &mut stop_rx => return,
                    r = Self::tick(&inner, session) => r,
                };
                match res {
                    Ok(_) => {}
                    Err(AugurError::StaleSession { .. } | AugurError::NoActiveSession) => return,
                    Err(_e) => {
                        #[cfg(feature = "tracing")]
                        tracing::warn!(error = %_e, "unexpected tick error");
                    }
                }

                let wait = backoff::next_delay(&inner.cfg, &inner.tx.borrow());
                drop(inner);
                tokio::select! {
                    biased;
                    _ = &mut stop_rx => return,
                    () = tokio::time::sleep(wait) => {}
                }
            }
        });
        PollHandle::new(join, stop_tx)
    }
}
