//! Forecast payloads consumed by the fusion engine, and the upstream wire shapes
//! they are normalized from.
//!
//! Numeric wire fields decode leniently: numbers and numeric strings are
//! accepted, anything else decodes to `NaN` so that normalization can reject
//! the affected horizon instead of failing the whole response.

use std::collections::BTreeMap;

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

/// Model id → blend weight. Weights are expected, but not required, to sum to 1.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnsembleWeights(BTreeMap<String, f64>);

impl EnsembleWeights {
    /// Empty weight map.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, model: impl Into<String>, weight: f64) -> Self {
        self.0.insert(model.into(), weight);
        self
    }

    /// Weight for `model`, if listed.
    #[must_use]
    pub fn get(&self, model: &str) -> Option<f64> {
        self.0.get(model).copied()
    }

    /// Iterate `(model, weight)` pairs in model-id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Sum of all listed weights.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.0.values().sum()
    }

    /// True if no weights are listed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for EnsembleWeights {
    fn from_iter<T: IntoIterator<Item = (K, f64)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Sentiment blend metadata, precomputed upstream.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HybridAdjustment {
    /// Raw ML price the adjustment applies to.
    pub ml_price: f64,
    /// Additive sentiment-derived adjustment.
    pub adjustment: f64,
    /// Price suggested by the AI narrative, kept for display only.
    pub ai_price: Option<f64>,
}

impl HybridAdjustment {
    /// `ml_price + adjustment`.
    #[must_use]
    pub fn hybrid_price(&self) -> f64 {
        self.ml_price + self.adjustment
    }
}

/// One upstream forecast for a single horizon. Never mutated by fusion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPayload {
    /// Days ahead the forecast targets. Values below 1 are rejected by fusion.
    pub horizon_days: i64,
    /// Precomputed central estimate.
    pub central_price: Option<f64>,
    /// Upstream change vs. the current price, in percent.
    pub change_percent: Option<f64>,
    /// Confidence interval `[low, high]`.
    pub confidence_interval: Option<[f64; 2]>,
    /// Per-submodel predictions for this horizon.
    pub submodel_prices: BTreeMap<String, f64>,
    /// Weights used to derive a central price when none is supplied.
    pub weights: Option<EnsembleWeights>,
    /// Sentiment adjustment for this horizon.
    pub hybrid: Option<HybridAdjustment>,
}

impl ForecastPayload {
    /// Payload for `horizon_days` with no fields set.
    #[must_use]
    pub const fn new(horizon_days: i64) -> Self {
        Self {
            horizon_days,
            central_price: None,
            change_percent: None,
            confidence_interval: None,
            submodel_prices: BTreeMap::new(),
            weights: None,
            hybrid: None,
        }
    }

    /// Set the central price.
    #[must_use]
    pub const fn with_central(mut self, price: f64) -> Self {
        self.central_price = Some(price);
        self
    }

    /// Set the upstream change percent.
    #[must_use]
    pub const fn with_change_percent(mut self, pct: f64) -> Self {
        self.change_percent = Some(pct);
        self
    }

    /// Set the confidence interval.
    #[must_use]
    pub const fn with_confidence(mut self, low: f64, high: f64) -> Self {
        self.confidence_interval = Some([low, high]);
        self
    }

    /// Add one submodel prediction.
    #[must_use]
    pub fn with_submodel(mut self, model: impl Into<String>, price: f64) -> Self {
        self.submodel_prices.insert(model.into(), price);
        self
    }

    /// Attach ensemble weights.
    #[must_use]
    pub fn with_weights(mut self, weights: EnsembleWeights) -> Self {
        self.weights = Some(weights);
        self
    }

    /// Attach a hybrid adjustment.
    #[must_use]
    pub const fn with_hybrid(mut self, hybrid: HybridAdjustment) -> Self {
        self.hybrid = Some(hybrid);
        self
    }
}

// ---------------------------------------------------------------------------
// Upstream wire shapes
// ---------------------------------------------------------------------------

/// Response of the ensemble price-prediction endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnsembleResponse {
    /// Symbol the forecast was produced for.
    #[serde(default)]
    pub symbol: String,
    /// Price the forecast was anchored on.
    #[serde(default, alias = "currentPrice", deserialize_with = "lenient_f64")]
    pub current_price: Option<f64>,
    /// Historical, current and predicted chart rows.
    #[serde(default, alias = "chartData")]
    pub chart_data: Vec<ChartDatum>,
    /// `next_<N>d` → per-horizon prediction.
    #[serde(default)]
    pub predictions: BTreeMap<String, EnsemblePrediction>,
    /// Blend weights per model.
    #[serde(default, alias = "modelWeights")]
    pub model_weights: Option<EnsembleWeights>,
    /// Per-model daily predictions, day 1 first.
    #[serde(default, alias = "modelPredictions")]
    pub model_predictions: BTreeMap<String, Vec<LenientF64>>,
    /// Whether the endpoint served the response from its cache.
    #[serde(default)]
    pub cached: bool,
}

/// One `predictions` entry of the ensemble response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnsemblePrediction {
    /// Ensemble central price.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub price: Option<f64>,
    /// Change vs. current price, in percent.
    #[serde(
        default,
        alias = "changePct",
        alias = "changePercent",
        deserialize_with = "lenient_f64"
    )]
    pub change_pct: Option<f64>,
    /// `[low, high]` confidence band.
    #[serde(default)]
    pub confidence: Option<Vec<LenientF64>>,
}

/// One `chart_data` row of the ensemble response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDatum {
    /// Day offset relative to today (negative for history, 0 for the current price).
    pub day: i64,
    /// Price at that offset.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub price: Option<f64>,
    /// `historical`, `current` or `predicted`.
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Upper band for predicted rows.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub upper: Option<f64>,
    /// Lower band for predicted rows.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub lower: Option<f64>,
}

/// Response of the sentiment-adjusted (hybrid) forecast endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HybridResponse {
    /// Symbol the forecast was produced for.
    #[serde(default)]
    pub symbol: Option<String>,
    /// `next_<N>d` → per-horizon hybrid prediction.
    #[serde(default, alias = "hybridPredictions")]
    pub predictions: BTreeMap<String, HybridPrediction>,
}

/// One horizon of the hybrid response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HybridPrediction {
    /// Final blended price as reported upstream.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub price: Option<f64>,
    /// Change vs. current price, in percent.
    #[serde(
        default,
        alias = "changePct",
        alias = "changePercent",
        deserialize_with = "lenient_f64"
    )]
    pub change_pct: Option<f64>,
    /// Raw ML price before adjustment.
    #[serde(default, alias = "mlPrice", deserialize_with = "lenient_f64")]
    pub ml_price: Option<f64>,
    /// Price suggested by the AI narrative.
    #[serde(
        default,
        alias = "geminiPrice",
        alias = "aiPrice",
        deserialize_with = "lenient_f64"
    )]
    pub ai_price: Option<f64>,
    /// Sentiment-derived adjustment added to `ml_price`.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub adjustment: Option<f64>,
}

/// Scenario forecast from the AI analysis endpoint, one bucket per horizon class.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioForecast {
    /// Short-term bucket (days to a couple of weeks).
    #[serde(default, alias = "shortTerm", alias = "short")]
    pub short_term: Option<ScenarioBucket>,
    /// One-month bucket.
    #[serde(default, alias = "oneMonth")]
    pub one_month: Option<ScenarioBucket>,
    /// Three-month bucket.
    #[serde(default, alias = "threeMonth")]
    pub three_month: Option<ScenarioBucket>,
    /// Long-term bucket.
    #[serde(default, alias = "longTerm")]
    pub long_term: Option<ScenarioBucket>,
}

/// One scenario bucket.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioBucket {
    /// Target price.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub price: Option<f64>,
    /// Absolute change vs. current price.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub change: Option<f64>,
    /// Change vs. current price, in percent.
    #[serde(default, alias = "changePercent", deserialize_with = "lenient_f64")]
    pub change_percent: Option<f64>,
    /// Human-readable timeframe, e.g. "1-2 weeks".
    #[serde(default)]
    pub timeframe: Option<String>,
}

/// Response of the intraday prediction endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntradayForecast {
    /// Symbol the forecast was produced for.
    #[serde(default)]
    pub symbol: String,
    /// Latest tick price the forecast started from.
    #[serde(default, alias = "currentPrice", deserialize_with = "lenient_f64")]
    pub current_price: Option<f64>,
    /// `5min` / `15min` / `30min` → prediction.
    #[serde(default)]
    pub predictions: BTreeMap<String, IntradayPrediction>,
}

/// One bucket of the intraday response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntradayPrediction {
    /// Predicted price.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub price: Option<f64>,
    /// Upper band.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub upper: Option<f64>,
    /// Lower band.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub lower: Option<f64>,
    /// `up` or `down`.
    #[serde(default)]
    pub direction: Option<String>,
    /// Change vs. latest tick, in percent.
    #[serde(
        default,
        alias = "changePct",
        alias = "changePercent",
        deserialize_with = "lenient_f64"
    )]
    pub change_pct: Option<f64>,
}

/// A number that decodes from JSON numbers or numeric strings, and to `NaN`
/// from anything else.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(transparent)]
pub struct LenientF64(pub f64);

impl<'de> Deserialize<'de> for LenientF64 {
    fn deserialize<D: Deserializer<'de>>(de: D) -> Result<Self, D::Error> {
        Ok(Self(lenient_f64(de)?.unwrap_or(f64::NAN)))
    }
}

fn lenient_f64<'de, D>(de: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(f64),
        Text(String),
        Other(IgnoredAny),
    }

    let raw: Option<Raw> = Option::deserialize(de)?;
    Ok(raw.map(|r| match r {
        Raw::Num(x) => x,
        Raw::Text(s) => s.trim().parse::<f64>().unwrap_or(f64::NAN),
        Raw::Other(_) => f64::NAN,
    }))
}
