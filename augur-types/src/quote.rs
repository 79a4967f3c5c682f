//! Quote endpoint shapes and the reconciled live snapshot.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::AugurError;

/// Trading session state as reported by the quote endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MarketState {
    /// Pre-market session (also covers `PREPRE`).
    Pre,
    /// Regular trading hours.
    Regular,
    /// After-hours session (also covers `POSTPOST`).
    Post,
    /// Market closed.
    Closed,
    /// Anything the endpoint reports that we do not recognize.
    #[default]
    Unknown,
}

impl MarketState {
    /// Canonical upper-case code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pre => "PRE",
            Self::Regular => "REGULAR",
            Self::Post => "POST",
            Self::Closed => "CLOSED",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl FromStr for MarketState {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_uppercase().as_str() {
            "PRE" | "PREPRE" => Self::Pre,
            "REGULAR" | "OPEN" => Self::Regular,
            "POST" | "POSTPOST" => Self::Post,
            "CLOSED" => Self::Closed,
            _ => Self::Unknown,
        })
    }
}

impl From<String> for MarketState {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(state) => state,
            Err(never) => match never {},
        }
    }
}

impl From<MarketState> for String {
    fn from(s: MarketState) -> Self {
        s.as_str().to_string()
    }
}

impl fmt::Display for MarketState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One response from the quote endpoint.
///
/// The endpoint answers either with quote fields or with `{ "error": "..." }`;
/// every field is optional so both shapes decode into this struct.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteTick {
    /// Last traded price.
    #[serde(default, alias = "regularMarketPrice")]
    pub price: Option<f64>,
    /// Session high reported by the source.
    #[serde(default, alias = "regularMarketDayHigh")]
    pub day_high: Option<f64>,
    /// Session low reported by the source.
    #[serde(default, alias = "regularMarketDayLow")]
    pub day_low: Option<f64>,
    /// Session volume.
    #[serde(default, alias = "regularMarketVolume")]
    pub volume: Option<u64>,
    /// Session state.
    #[serde(default)]
    pub market_state: Option<MarketState>,
    /// Source timestamp, as RFC 3339 text or epoch seconds/milliseconds.
    #[serde(default, deserialize_with = "de_timestamp")]
    pub timestamp: Option<DateTime<Utc>>,
    /// Error message when the endpoint reports a failure in-band.
    #[serde(default)]
    pub error: Option<String>,
}

impl QuoteTick {
    /// Convenience constructor for a tick carrying only a price.
    #[must_use]
    pub fn price(price: f64) -> Self {
        Self {
            price: Some(price),
            ..Self::default()
        }
    }

    /// Convenience constructor for an in-band error response.
    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            error: Some(msg.into()),
            ..Self::default()
        }
    }

    /// Builder-style setter for the reported day range.
    #[must_use]
    pub const fn with_range(mut self, low: f64, high: f64) -> Self {
        self.day_low = Some(low);
        self.day_high = Some(high);
        self
    }
}

// Epoch values above this are treated as milliseconds.
const EPOCH_MILLIS_THRESHOLD: i64 = 100_000_000_000;

fn de_timestamp<'de, D>(de: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Float(f64),
        Text(String),
    }

    let raw: Option<Raw> = Option::deserialize(de)?;
    Ok(match raw {
        None => None,
        Some(Raw::Int(n)) => from_epoch(n),
        #[allow(clippy::cast_possible_truncation)]
        Some(Raw::Float(x)) if x.is_finite() => from_epoch(x as i64),
        Some(Raw::Float(_)) => None,
        Some(Raw::Text(s)) => DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok(),
    })
}

fn from_epoch(n: i64) -> Option<DateTime<Utc>> {
    if n.abs() >= EPOCH_MILLIS_THRESHOLD {
        DateTime::from_timestamp_millis(n)
    } else {
        DateTime::from_timestamp(n, 0)
    }
}

/// Reconciled view of the current quote for one live session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteSnapshot {
    /// Symbol this snapshot belongs to.
    pub symbol: String,
    /// Latest accepted price.
    pub price: f64,
    /// Reference price the latest tick was compared against (pre-tick value).
    pub previous_reference_price: f64,
    /// Price captured when the session started; `delta` is measured from here.
    pub anchor_price: f64,
    /// `price - anchor_price`.
    pub delta: f64,
    /// `delta` as a percentage of `anchor_price` (0 when the anchor is 0).
    pub delta_percent: f64,
    /// Whether the latest tick moved up relative to the previous reference.
    pub is_increasing: bool,
    /// Latest reported session volume.
    pub volume: Option<u64>,
    /// Widest high seen during the session.
    pub day_high: f64,
    /// Widest low seen during the session.
    pub day_low: f64,
    /// Latest reported session state.
    pub market_state: MarketState,
    /// Freshness timestamp of the latest accepted tick.
    pub as_of: DateTime<Utc>,
}

/// What the reconciler publishes to subscribers on every state change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LiveQuote {
    /// Monotonic session id; bumps on every symbol switch or disable.
    pub session: u64,
    /// Symbol being tracked, if live mode is on.
    pub symbol: Option<String>,
    /// Latest good snapshot for the current session.
    pub snapshot: Option<QuoteSnapshot>,
    /// Stale-data indicator: set after the configured number of consecutive failures.
    pub degraded: bool,
    /// Consecutive failed ticks in the current session.
    pub consecutive_failures: u32,
    /// Most recent tick failure, cleared on the next good tick.
    pub last_error: Option<AugurError>,
}
