//! Prediction fusion engine.
//!
//! Merges a historical + short-horizon base series with any number of
//! long-horizon forecast payloads into one ordinal-indexed [`FusedSeries`].
//!
//! - `axis`: base construction, rank-based horizon placement, boundary bridging
//! - `blend`: payload validation, ensemble fallback weighting, hybrid price
//! - `range`: value-axis bounds
//!
//! Fusion is a pure function of its inputs: no I/O, no shared state, no
//! caching. Defective inputs are excluded and reported in
//! [`FusedSeries::rejected`]; fusion itself never fails.
/// Ordinal axis construction, horizon placement, and bridging.
pub mod axis;
/// Payload validation and blended values.
pub mod blend;
/// Value-axis bounds.
pub mod range;

use augur_types::{AugurError, BaseEntry, ForecastPayload, FusedSeries, FusionConfig};

/// Fuse with the default [`FusionConfig`].
#[must_use]
pub fn fuse(
    base: &[BaseEntry],
    payloads: &[ForecastPayload],
    current_price: f64,
) -> FusedSeries {
    fuse_with(base, payloads, current_price, &FusionConfig::default())
}

/// Fuse a base series and long-horizon payloads onto one ordinal axis.
///
/// Steps, in order:
/// 1. one point per base entry; `H` = number of observed (historical) entries
/// 2. each valid payload lands at `H + rank(horizon)` among distinct horizons,
///    merging into an existing point or appending `+{d}d`
/// 3. submodel prices share their horizon's ordinal
/// 4. forecast fields are bridged at the last historical point
/// 5. the value range is computed over every defined field
#[must_use]
pub fn fuse_with(
    base: &[BaseEntry],
    payloads: &[ForecastPayload],
    current_price: f64,
    cfg: &FusionConfig,
) -> FusedSeries {
    let mut rejected: Vec<AugurError> = Vec::new();
    if base.is_empty() {
        rejected.push(AugurError::EmptyInput);
    }

    let (mut points, historical_len) = axis::build_base(base, &mut rejected);

    let mut resolved = Vec::with_capacity(payloads.len());
    for p in payloads {
        match blend::resolve(p) {
            Ok(r) => resolved.push(r),
            Err(e) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(horizon = p.horizon_days, error = %e, "excluding forecast payload from fusion");
                rejected.push(e);
            }
        }
    }

    let horizons = axis::place_horizons(&mut points, historical_len, &resolved);
    axis::bridge_boundary(&mut points);
    let value_range = range::value_range(&points, current_price, cfg);

    #[cfg(feature = "tracing")]
    tracing::debug!(
        points = points.len(),
        historical = historical_len,
        horizons = horizons.len(),
        rejected = rejected.len(),
        "fused prediction series"
    );

    FusedSeries {
        points,
        historical_len,
        current_price,
        horizons,
        value_range,
        rejected,
    }
}
