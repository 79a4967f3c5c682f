//! Shared ordinal axis: base construction, horizon placement, and boundary bridging.

use std::collections::{BTreeMap, BTreeSet};

use augur_types::{AugurError, BaseEntry, EntryKind, HorizonSlot, SeriesPoint, Zone};

use super::blend::ResolvedForecast;

/// Build one point per base entry, in input order.
///
/// Returns the points and `H`, the number of historical-zone points. Entries
/// with a non-finite price keep their ordinal but carry no value.
pub fn build_base(
    base: &[BaseEntry],
    rejected: &mut Vec<AugurError>,
) -> (Vec<SeriesPoint>, usize) {
    let mut points = Vec::with_capacity(base.len());
    let mut historical_len = 0usize;
    for (ordinal, entry) in base.iter().enumerate() {
        let zone = match entry.kind {
            EntryKind::Actual => Zone::Historical,
            EntryKind::Forecast => Zone::ShortForecast,
        };
        let mut point = SeriesPoint::new(entry.label.clone(), ordinal, zone);
        if entry.price.is_finite() {
            match entry.kind {
                EntryKind::Actual => point.historical = Some(entry.price),
                EntryKind::Forecast => point.short_forecast = Some(entry.price),
            }
        } else {
            rejected.push(AugurError::Data(format!(
                "base entry `{}` has a non-finite price",
                entry.label
            )));
        }
        if zone == Zone::Historical {
            historical_len += 1;
        }
        points.push(point);
    }
    (points, historical_len)
}

/// Place resolved forecasts at `H + rank(horizon)`.
///
/// Ranks are taken over the sorted distinct horizons, so the axis stays
/// ordinal rather than calendar-linear. Missing ordinals are appended as
/// long-forecast points labeled `+{d}d`; existing ones are merged into.
/// Payloads are merged in input order, later values winning per field.
pub fn place_horizons(
    points: &mut Vec<SeriesPoint>,
    historical_len: usize,
    forecasts: &[ResolvedForecast],
) -> Vec<HorizonSlot> {
    let distinct: BTreeSet<u32> = forecasts.iter().map(|f| f.horizon_days).collect();
    let mut slots: BTreeMap<u32, usize> = BTreeMap::new();

    for (rank, horizon) in distinct.into_iter().enumerate() {
        let ordinal = historical_len + rank;
        if ordinal >= points.len() {
            // Ordinals are consecutive from H and H <= len, so this always appends at `ordinal`.
            points.push(SeriesPoint::new(
                format!("+{horizon}d"),
                ordinal,
                Zone::LongForecast,
            ));
        }
        points[ordinal].horizon_days = Some(horizon);
        slots.insert(horizon, ordinal);
    }

    for f in forecasts {
        let Some(&ordinal) = slots.get(&f.horizon_days) else {
            continue;
        };
        merge_into(&mut points[ordinal], f);
    }

    slots
        .into_iter()
        .map(|(horizon_days, ordinal)| HorizonSlot {
            horizon_days,
            ordinal,
        })
        .collect()
}

fn merge_into(point: &mut SeriesPoint, f: &ResolvedForecast) {
    if let Some(v) = f.ensemble_price {
        point.ensemble_price = Some(v);
    }
    if let Some((lo, hi)) = f.bounds {
        point.ensemble_lower = Some(lo);
        point.ensemble_upper = Some(hi);
    }
    if let Some(v) = f.hybrid_price {
        point.hybrid_price = Some(v);
    }
    for (model, price) in &f.submodels {
        point.submodel_prices.insert(model.clone(), *price);
    }
}

/// Copy the last observed price into forecast fields that are undefined at
/// the last historical point but defined somewhere in the series.
///
/// Only that single ordinal is touched. Confidence bounds are never bridged.
pub fn bridge_boundary(points: &mut [SeriesPoint]) {
    let Some(idx) = points.iter().rposition(|p| p.historical.is_some()) else {
        return;
    };
    let Some(last) = points[idx].historical else {
        return;
    };

    let has_short = points.iter().any(|p| p.short_forecast.is_some());
    let has_ensemble = points.iter().any(|p| p.ensemble_price.is_some());
    let has_hybrid = points.iter().any(|p| p.hybrid_price.is_some());
    let models: BTreeSet<String> = points
        .iter()
        .flat_map(|p| p.submodel_prices.keys().cloned())
        .collect();

    let anchor = &mut points[idx];
    if has_short && anchor.short_forecast.is_none() {
        anchor.short_forecast = Some(last);
    }
    if has_ensemble && anchor.ensemble_price.is_none() {
        anchor.ensemble_price = Some(last);
    }
    if has_hybrid && anchor.hybrid_price.is_none() {
        anchor.hybrid_price = Some(last);
    }
    for model in models {
        anchor.submodel_prices.entry(model).or_insert(last);
    }
}
