//! Normalization of upstream forecast responses into fusion inputs.
//!
//! Only structural problems are rejected here (unreadable horizon keys,
//! malformed confidence arrays). Numeric validation happens once, in
//! [`crate::fusion::blend::resolve`].

use augur_types::{
    AugurError, BaseEntry, EnsembleResponse, ForecastPayload, HybridAdjustment, HybridResponse,
    IntradayForecast, ScenarioForecast,
};

/// Payloads produced from one upstream response, plus what was rejected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Normalized {
    /// Payloads sorted by horizon.
    pub payloads: Vec<ForecastPayload>,
    /// Entries that could not be turned into payloads.
    pub rejected: Vec<AugurError>,
}

/// Parse a horizon key such as `next_5d`, `5d`, `+5d` or `5`.
///
/// Returns the signed day count so callers can reject non-positive horizons
/// with a precise message.
#[must_use]
pub fn parse_horizon_key(key: &str) -> Option<i64> {
    let k = key.trim();
    let k = k.strip_prefix("next_").unwrap_or(k);
    let k = k.strip_prefix('+').unwrap_or(k);
    let k = k
        .strip_suffix('d')
        .or_else(|| k.strip_suffix('D'))
        .unwrap_or(k);
    k.parse::<i64>().ok()
}

fn unreadable_key(key: &str) -> AugurError {
    AugurError::malformed(None, format!("unrecognized horizon key `{key}`"))
}

/// Ensemble response → one payload per `next_<N>d` prediction.
///
/// The submodel price for horizon `N` is element `N-1` of each model's daily
/// array; missing or non-numeric elements are skipped. Model weights are
/// attached to every payload so fusion can derive a central price when the
/// prediction lacks one.
#[must_use]
pub fn from_ensemble(resp: &EnsembleResponse) -> Normalized {
    let mut out = Normalized::default();
    for (key, pred) in &resp.predictions {
        let Some(horizon) = parse_horizon_key(key) else {
            out.rejected.push(unreadable_key(key));
            continue;
        };

        let mut payload = ForecastPayload::new(horizon);
        payload.central_price = pred.price;
        payload.change_percent = pred.change_pct;

        match pred.confidence.as_deref() {
            None => {}
            Some([lo, hi]) => payload.confidence_interval = Some([lo.0, hi.0]),
            Some(other) => {
                out.rejected.push(AugurError::malformed(
                    Some(horizon),
                    format!("confidence has {} bounds, expected 2", other.len()),
                ));
                continue;
            }
        }

        if let Some(idx) = usize::try_from(horizon).ok().and_then(|h| h.checked_sub(1)) {
            for (model, daily) in &resp.model_predictions {
                if let Some(v) = daily.get(idx).map(|v| v.0).filter(|v| v.is_finite()) {
                    payload.submodel_prices.insert(model.clone(), v);
                }
            }
        }

        payload.weights.clone_from(&resp.model_weights);
        out.payloads.push(payload);
    }
    out.payloads.sort_by_key(|p| p.horizon_days);
    out
}

/// Hybrid response → payloads whose central price is the raw ML price and
/// whose adjustment carries the sentiment delta.
///
/// When upstream omits `adjustment` but reports both the final and ML price,
/// the adjustment is their difference. Without an ML price the final price is
/// used as the central estimate and no adjustment is attached.
#[must_use]
pub fn from_hybrid(resp: &HybridResponse) -> Normalized {
    let mut out = Normalized::default();
    for (key, pred) in &resp.predictions {
        let Some(horizon) = parse_horizon_key(key) else {
            out.rejected.push(unreadable_key(key));
            continue;
        };

        let mut payload = ForecastPayload::new(horizon);
        payload.change_percent = pred.change_pct;
        match pred.ml_price {
            Some(ml) => {
                payload.central_price = Some(ml);
                let adjustment = pred.adjustment.or_else(|| pred.price.map(|p| p - ml));
                payload.hybrid = adjustment.map(|adjustment| HybridAdjustment {
                    ml_price: ml,
                    adjustment,
                    ai_price: pred.ai_price,
                });
            }
            None => payload.central_price = pred.price,
        }
        out.payloads.push(payload);
    }
    out.payloads.sort_by_key(|p| p.horizon_days);
    out
}

/// Ensemble `chart_data` → base entries.
///
/// `historical` and `current` rows are observed prices, `predicted` rows are
/// short-horizon forecasts. Rows are ordered by day offset; rows without a
/// price or with an unknown type are dropped.
#[must_use]
pub fn chart_entries(resp: &EnsembleResponse) -> Vec<BaseEntry> {
    let mut rows: Vec<_> = resp.chart_data.iter().collect();
    rows.sort_by_key(|r| r.day);
    rows.into_iter()
        .filter_map(|r| {
            let price = r.price?;
            let label = day_label(r.day);
            match r.kind.as_str() {
                "historical" | "current" => Some(BaseEntry::actual(label, price)),
                "predicted" => Some(BaseEntry::forecast(label, price)),
                _ => None,
            }
        })
        .collect()
}

fn day_label(day: i64) -> String {
    match day {
        0 => "now".to_string(),
        d if d > 0 => format!("+{d}d"),
        d => format!("{d}d"),
    }
}

/// Scenario forecast → short-forecast base entries, short term first.
///
/// Entries are labeled by the bucket's timeframe when present.
#[must_use]
pub fn scenario_entries(s: &ScenarioForecast) -> Vec<BaseEntry> {
    [
        ("short term", &s.short_term),
        ("1 month", &s.one_month),
        ("3 months", &s.three_month),
        ("long term", &s.long_term),
    ]
    .into_iter()
    .filter_map(|(fallback, bucket)| {
        let b = bucket.as_ref()?;
        let price = b.price.filter(|p| p.is_finite())?;
        let label = b
            .timeframe
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(fallback);
        Some(BaseEntry::forecast(label, price))
    })
    .collect()
}

/// Intraday forecast → short-forecast base entries ordered by minutes ahead,
/// labeled `+{m}m`.
#[must_use]
pub fn intraday_entries(f: &IntradayForecast) -> Vec<BaseEntry> {
    let mut buckets: Vec<(u32, f64)> = f
        .predictions
        .iter()
        .filter_map(|(key, pred)| {
            let minutes = key
                .trim()
                .strip_suffix("min")
                .or_else(|| key.trim().strip_suffix('m'))?
                .parse::<u32>()
                .ok()?;
            let price = pred.price.filter(|p| p.is_finite())?;
            Some((minutes, price))
        })
        .collect();
    buckets.sort_by_key(|(m, _)| *m);
    buckets
        .into_iter()
        .map(|(m, price)| BaseEntry::forecast(format!("+{m}m"), price))
        .collect()
}

/// Decode an ensemble response body.
///
/// # Errors
/// Returns `Data` when the body is not a JSON object of the expected shape.
pub fn parse_ensemble(body: &str) -> Result<EnsembleResponse, AugurError> {
    serde_json::from_str(body).map_err(|e| AugurError::Data(format!("ensemble response: {e}")))
}

/// Decode a hybrid response body.
///
/// # Errors
/// Returns `Data` when the body is not a JSON object of the expected shape.
pub fn parse_hybrid(body: &str) -> Result<HybridResponse, AugurError> {
    serde_json::from_str(body).map_err(|e| AugurError::Data(format!("hybrid response: {e}")))
}
