//! Input entries and fused output points on the shared ordinal axis.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::AugurError;

/// Classification of a fused point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    /// Observed actual price.
    Historical,
    /// Short-horizon forecast carried in the base series.
    ShortForecast,
    /// Point appended for a long-horizon payload.
    LongForecast,
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Historical => "historical",
            Self::ShortForecast => "short_forecast",
            Self::LongForecast => "long_forecast",
        })
    }
}

/// Whether a base entry was observed or forecast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// Observed market price.
    Actual,
    /// Short-horizon forecast.
    Forecast,
}

/// One entry of the historical + short-horizon input series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseEntry {
    /// Axis key, e.g. a date string or `+3d`.
    pub label: String,
    /// Price carried by the entry.
    pub price: f64,
    /// Observed or forecast.
    pub kind: EntryKind,
}

impl BaseEntry {
    /// An observed price.
    pub fn actual(label: impl Into<String>, price: f64) -> Self {
        Self {
            label: label.into(),
            price,
            kind: EntryKind::Actual,
        }
    }

    /// A short-horizon forecast price.
    pub fn forecast(label: impl Into<String>, price: f64) -> Self {
        Self {
            label: label.into(),
            price,
            kind: EntryKind::Forecast,
        }
    }
}

/// One fused, axis-aligned datum. Unique by `ordinal` within a fused series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    /// Axis key shown to users.
    pub label: String,
    /// Position on the shared axis.
    pub ordinal: usize,
    /// Classification of the point.
    pub zone: Zone,
    /// Horizon of the long-horizon payload placed here, if any.
    pub horizon_days: Option<u32>,
    /// Observed price.
    pub historical: Option<f64>,
    /// Short-horizon forecast price.
    pub short_forecast: Option<f64>,
    /// Raw ensemble (ML) central price.
    pub ensemble_price: Option<f64>,
    /// Upper confidence bound of the ensemble estimate.
    pub ensemble_upper: Option<f64>,
    /// Lower confidence bound of the ensemble estimate.
    pub ensemble_lower: Option<f64>,
    /// Sentiment-adjusted price (`ml_price + adjustment`).
    pub hybrid_price: Option<f64>,
    /// Per-submodel prices keyed by model id.
    pub submodel_prices: BTreeMap<String, f64>,
}

impl SeriesPoint {
    /// An empty point at `ordinal`.
    pub fn new(label: impl Into<String>, ordinal: usize, zone: Zone) -> Self {
        Self {
            label: label.into(),
            ordinal,
            zone,
            horizon_days: None,
            historical: None,
            short_forecast: None,
            ensemble_price: None,
            ensemble_upper: None,
            ensemble_lower: None,
            hybrid_price: None,
            submodel_prices: BTreeMap::new(),
        }
    }

    /// Price to display for this point's forecast: the hybrid price when
    /// present, otherwise the raw ensemble price.
    #[must_use]
    pub fn display_price(&self) -> Option<f64> {
        self.hybrid_price.or(self.ensemble_price)
    }

    /// Iterate every defined numeric field on the point.
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        [
            self.historical,
            self.short_forecast,
            self.ensemble_price,
            self.ensemble_upper,
            self.ensemble_lower,
            self.hybrid_price,
        ]
        .into_iter()
        .flatten()
        .chain(self.submodel_prices.values().copied())
    }
}

/// Where a horizon landed on the axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HorizonSlot {
    /// Forecast horizon in days.
    pub horizon_days: u32,
    /// Ordinal the horizon was placed at.
    pub ordinal: usize,
}

/// Numeric summary for "expected price in N days" displays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HorizonSummary {
    /// Forecast horizon in days.
    pub horizon_days: u32,
    /// Ordinal of the fused point.
    pub ordinal: usize,
    /// Display price (hybrid over ensemble).
    pub price: f64,
    /// Raw ensemble price, when known.
    pub ml_price: Option<f64>,
    /// Sentiment-adjusted price, when known.
    pub hybrid_price: Option<f64>,
    /// Change of `price` relative to the current price, in percent.
    pub change_percent: f64,
    /// Confidence bounds `(low, high)`, when supplied.
    pub confidence: Option<(f64, f64)>,
}

/// Output of one fusion pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusedSeries {
    /// Points ordered by ordinal; `points[i].ordinal == i`.
    pub points: Vec<SeriesPoint>,
    /// Number of historical-zone points in the base series.
    pub historical_len: usize,
    /// Current price the series was fused against.
    pub current_price: f64,
    /// Horizon placements, ascending by horizon.
    pub horizons: Vec<HorizonSlot>,
    /// Value-axis bounds `(min, max)` including the configured margin.
    pub value_range: (f64, f64),
    /// Inputs excluded from fusion, with the reason.
    pub rejected: Vec<AugurError>,
}

impl FusedSeries {
    /// Value-axis bounds `(min, max)` for sizing a chart.
    #[must_use]
    pub const fn value_range(&self) -> (f64, f64) {
        self.value_range
    }

    /// Ordinal a horizon was placed at.
    #[must_use]
    pub fn slot(&self, horizon_days: u32) -> Option<usize> {
        self.horizons
            .iter()
            .find(|s| s.horizon_days == horizon_days)
            .map(|s| s.ordinal)
    }

    /// Point a horizon was placed at.
    #[must_use]
    pub fn point_for_horizon(&self, horizon_days: u32) -> Option<&SeriesPoint> {
        self.slot(horizon_days).and_then(|o| self.points.get(o))
    }

    /// Point carrying the last observed price.
    #[must_use]
    pub fn last_historical(&self) -> Option<&SeriesPoint> {
        self.points.iter().rev().find(|p| p.historical.is_some())
    }

    /// Summary of the forecast at `horizon_days`, if that horizon carries a price.
    #[must_use]
    pub fn summary(&self, horizon_days: u32) -> Option<HorizonSummary> {
        let point = self.point_for_horizon(horizon_days)?;
        let price = point.display_price()?;
        let change_percent = if self.current_price == 0.0 {
            0.0
        } else {
            (price - self.current_price) / self.current_price * 100.0
        };
        let confidence = match (point.ensemble_lower, point.ensemble_upper) {
            (Some(lo), Some(hi)) => Some((lo, hi)),
            _ => None,
        };
        Some(HorizonSummary {
            horizon_days,
            ordinal: point.ordinal,
            price,
            ml_price: point.ensemble_price,
            hybrid_price: point.hybrid_price,
            change_percent,
            confidence,
        })
    }
}
