//! Per-payload validation and blended values: ensemble fallback and hybrid price.

use std::collections::BTreeMap;

use augur_types::{AugurError, EnsembleWeights, ForecastPayload};

/// A payload reduced to the values fusion places on the axis.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedForecast {
    /// Validated horizon (>= 1).
    pub horizon_days: u32,
    /// Raw ensemble / ML price.
    pub ensemble_price: Option<f64>,
    /// Ordered `(low, high)` confidence bounds.
    pub bounds: Option<(f64, f64)>,
    /// `ml_price + adjustment`, when a hybrid adjustment is present.
    pub hybrid_price: Option<f64>,
    /// Submodel prices for this horizon.
    pub submodels: BTreeMap<String, f64>,
}

/// Weighted ensemble price over the models present in both maps.
///
/// Models listed in `prices` without a weight contribute zero, and the
/// remaining weights are NOT renormalized. Whether upstream intends this or
/// it is a bug is undecided; keep the zero-contribution behaviour until a
/// product decision says otherwise.
///
/// Returns `None` when no model appears in both maps.
#[must_use]
pub fn weighted_central(prices: &BTreeMap<String, f64>, weights: &EnsembleWeights) -> Option<f64> {
    let mut matched = false;
    let mut total = 0.0;
    for (model, price) in prices {
        if let Some(w) = weights.get(model) {
            matched = true;
            total += w * price;
        }
    }
    matched.then_some(total)
}

fn ensure_finite(horizon: i64, what: &str, v: f64) -> Result<f64, AugurError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(AugurError::malformed(
            Some(horizon),
            format!("{what} is not a finite number"),
        ))
    }
}

/// Validate a payload and compute its blended values.
///
/// # Errors
/// Returns `MalformedForecast` when the horizon is below 1, any supplied
/// number is non-finite, a weight is negative, or the payload carries no
/// price information at all.
pub fn resolve(p: &ForecastPayload) -> Result<ResolvedForecast, AugurError> {
    let h = p.horizon_days;
    if h < 1 {
        return Err(AugurError::malformed(Some(h), "horizon must be >= 1 day"));
    }
    let horizon_days = u32::try_from(h)
        .map_err(|_| AugurError::malformed(Some(h), "horizon exceeds supported range"))?;

    let central = p
        .central_price
        .map(|v| ensure_finite(h, "central price", v))
        .transpose()?;

    let bounds = match p.confidence_interval {
        Some([a, b]) => {
            let a = ensure_finite(h, "confidence bound", a)?;
            let b = ensure_finite(h, "confidence bound", b)?;
            Some((a.min(b), a.max(b)))
        }
        None => None,
    };

    let mut submodels = BTreeMap::new();
    for (model, price) in &p.submodel_prices {
        let v = ensure_finite(h, &format!("submodel `{model}` price"), *price)?;
        submodels.insert(model.clone(), v);
    }

    if let Some(w) = &p.weights {
        for (model, weight) in w.iter() {
            if !weight.is_finite() || weight < 0.0 {
                return Err(AugurError::malformed(
                    Some(h),
                    format!("weight for `{model}` must be a non-negative number"),
                ));
            }
        }
    }

    let hybrid = match &p.hybrid {
        Some(adj) => {
            ensure_finite(h, "hybrid ml price", adj.ml_price)?;
            ensure_finite(h, "hybrid adjustment", adj.adjustment)?;
            if let Some(ai) = adj.ai_price {
                ensure_finite(h, "hybrid ai price", ai)?;
            }
            Some(*adj)
        }
        None => None,
    };

    let ensemble_price = central
        .or_else(|| {
            p.weights
                .as_ref()
                .filter(|w| !w.is_empty() && w.total() > 0.0)
                .and_then(|w| weighted_central(&submodels, w))
        })
        .or_else(|| hybrid.map(|adj| adj.ml_price));
    let hybrid_price = hybrid.map(|adj| adj.hybrid_price());

    if ensemble_price.is_none() && bounds.is_none() && hybrid_price.is_none() && submodels.is_empty()
    {
        return Err(AugurError::malformed(Some(h), "payload carries no price"));
    }

    Ok(ResolvedForecast {
        horizon_days,
        ensemble_price,
        bounds,
        hybrid_price,
        submodels,
    })
}
