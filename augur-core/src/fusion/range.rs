use augur_types::{FusionConfig, SeriesPoint};

/// Smallest padding applied on each side, so a flat series at zero still
/// yields a non-empty range.
pub const MIN_PAD: f64 = 0.01;

fn pad(v: f64, fraction: f64) -> f64 {
    (v.abs() * fraction).max(MIN_PAD)
}

/// Min/max over every defined numeric field, pushed outward by
/// `cfg.range_margin` on each side (at least [`MIN_PAD`]).
///
/// With no numeric values at all, falls back to `current_price ± fallback_band`,
/// with the same floor.
#[must_use]
pub fn value_range(points: &[SeriesPoint], current_price: f64, cfg: &FusionConfig) -> (f64, f64) {
    let bounds = points
        .iter()
        .flat_map(SeriesPoint::values)
        .filter(|v| v.is_finite())
        .fold(None, |acc: Option<(f64, f64)>, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        });

    match bounds {
        Some((lo, hi)) => (
            lo - pad(lo, cfg.range_margin),
            hi + pad(hi, cfg.range_margin),
        ),
        None => (
            current_price - pad(current_price, cfg.fallback_band),
            current_price + pad(current_price, cfg.fallback_band),
        ),
    }
}
