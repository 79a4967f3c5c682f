//! Configuration types shared by the reconciler and the fusion engine.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::AugurError;

/// Exponential backoff applied to the poll period while the feed is degraded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackoffConfig {
    /// Minimum backoff delay in milliseconds.
    pub min_backoff_ms: u64,
    /// Maximum backoff delay in milliseconds.
    pub max_backoff_ms: u64,
    /// Exponential factor to increase delay after each further failure (>= 1).
    pub factor: u32,
    /// Random jitter percentage [0, 100] added to each delay.
    pub jitter_percent: u8,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            min_backoff_ms: 2_000,
            max_backoff_ms: 30_000,
            factor: 2,
            jitter_percent: 20,
        }
    }
}

/// Configuration for the live quote reconciler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcilerConfig {
    /// Fixed period between poll ticks.
    pub poll_interval: Duration,
    /// Upper bound on a single fetch; an expired fetch counts as a failed tick.
    pub fetch_timeout: Duration,
    /// Consecutive failed ticks after which the feed is flagged as degraded.
    pub degraded_after: u32,
    /// Optional backoff used only while degraded. `None` keeps the period fixed.
    pub backoff: Option<BackoffConfig>,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            fetch_timeout: Duration::from_secs(5),
            degraded_after: 3,
            backoff: None,
        }
    }
}

impl ReconcilerConfig {
    /// Check the configuration for values the poll loop cannot honor.
    ///
    /// # Errors
    /// Returns `InvalidArg` for a zero interval or timeout, a zero degraded
    /// threshold, or an inconsistent backoff configuration.
    pub fn validate(&self) -> Result<(), AugurError> {
        if self.poll_interval.is_zero() {
            return Err(AugurError::InvalidArg("poll_interval must be > 0".into()));
        }
        if self.fetch_timeout.is_zero() {
            return Err(AugurError::InvalidArg("fetch_timeout must be > 0".into()));
        }
        if self.degraded_after == 0 {
            return Err(AugurError::InvalidArg("degraded_after must be >= 1".into()));
        }
        if let Some(b) = &self.backoff {
            if b.factor == 0 {
                return Err(AugurError::InvalidArg("backoff factor must be >= 1".into()));
            }
            if b.min_backoff_ms > b.max_backoff_ms {
                return Err(AugurError::InvalidArg(format!(
                    "backoff min ({}ms) exceeds max ({}ms)",
                    b.min_backoff_ms, b.max_backoff_ms
                )));
            }
            if b.jitter_percent > 100 {
                return Err(AugurError::InvalidArg(
                    "backoff jitter_percent must be within [0, 100]".into(),
                ));
            }
        }
        Ok(())
    }
}

/// Tuning knobs for the fusion engine's derived outputs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FusionConfig {
    /// Fractional margin applied outward to each side of the value range.
    pub range_margin: f64,
    /// Fractional band around the current price used when no point carries a value.
    pub fallback_band: f64,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            range_margin: 0.02,
            fallback_band: 0.05,
        }
    }
}
