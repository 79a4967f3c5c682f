use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for the augur workspace.
///
/// This covers quote-source failures, malformed forecast payloads, argument
/// validation, and the session guards used by the live reconciler.
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AugurError {
    /// A quote fetch failed at the network or decoding layer.
    #[error("{source_name} quote fetch failed: {msg}")]
    QuoteFetch {
        /// Name of the quote source that failed.
        source_name: String,
        /// Human-readable error message.
        msg: String,
    },

    /// A single quote fetch exceeded the configured timeout.
    #[error("{source_name} timed out after {after_ms}ms")]
    SourceTimeout {
        /// Name of the quote source that timed out.
        source_name: String,
        /// Timeout that elapsed, in milliseconds.
        after_ms: u64,
    },

    /// A resource or symbol could not be found.
    #[error("not found: {what}")]
    NotFound {
        /// Description of missing resource, e.g. "quote for AAPL".
        what: String,
    },

    /// A forecast payload was excluded from fusion.
    #[error("malformed forecast payload (horizon {horizon:?}): {reason}")]
    MalformedForecast {
        /// Horizon the payload claimed, if it could be read at all.
        horizon: Option<i64>,
        /// Why the payload was rejected.
        reason: String,
    },

    /// Fusion received no historical or short-horizon entries.
    #[error("empty input: no historical or short-horizon series")]
    EmptyInput,

    /// Invalid input argument.
    #[error("invalid argument: {0}")]
    InvalidArg(String),

    /// A tick resolved after its session had been replaced or disabled.
    #[error("stale session: tick for {symbol} discarded")]
    StaleSession {
        /// Symbol the discarded tick was issued for.
        symbol: String,
    },

    /// No symbol is currently tracked.
    #[error("no active live session")]
    NoActiveSession,

    /// Issues with the returned or expected data (missing fields, etc.).
    #[error("data issue: {0}")]
    Data(String),

    /// Unknown/opaque error.
    #[error("unknown error: {0}")]
    Other(String),
}

impl AugurError {
    /// Helper: build a `QuoteFetch` error with the source name and message.
    pub fn quote_fetch(source_name: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::QuoteFetch {
            source_name: source_name.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build a `NotFound` error for a description of the missing resource.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Helper: build a `MalformedForecast` error.
    pub fn malformed(horizon: Option<i64>, reason: impl Into<String>) -> Self {
        Self::MalformedForecast {
            horizon,
            reason: reason.into(),
        }
    }

    /// Helper: build a `SourceTimeout` error.
    pub fn source_timeout(source_name: impl Into<String>, after_ms: u64) -> Self {
        Self::SourceTimeout {
            source_name: source_name.into(),
            after_ms,
        }
    }

    /// Returns true if this error counts toward the reconciler's degraded threshold.
    ///
    /// Session-guard outcomes and argument errors are not failures of the quote
    /// source and never mark the feed as degraded.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::QuoteFetch { .. }
                | Self::SourceTimeout { .. }
                | Self::NotFound { .. }
                | Self::Data(_)
                | Self::Other(_)
        )
    }
}
