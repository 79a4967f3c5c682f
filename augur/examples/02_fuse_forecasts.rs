mod common;

use augur::payload::{self, chart_entries, from_ensemble};
use augur::{EntryKind, fuse};
use common::{get_forecasts, init_tracing};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let symbol = "AAPL";
    let current = 190.0;
    // Thirty days of synthetic closes drifting up to the current price.
    let history: Vec<f64> = (0..30).map(|i| 175.0 + f64::from(i) * 0.5).collect();

    // 1. Ask the prediction service for the multi-horizon ensemble.
    let forecasts = get_forecasts();
    let resp = forecasts
        .ensemble_forecast(symbol, &history, current)
        .await?;

    // 2. Normalize the wire shape into fusion inputs.
    let base = chart_entries(&resp);
    let normalized = from_ensemble(&resp);
    for e in &normalized.rejected {
        eprintln!("skipped: {e}");
    }

    // 3. Fuse onto one axis and print it.
    let fused = fuse(&base, &normalized.payloads, resp.current_price.unwrap_or(current));
    println!(
        "{} points, {} historical, value range {:.2}..{:.2}",
        fused.points.len(),
        fused.historical_len,
        fused.value_range.0,
        fused.value_range.1
    );
    for p in &fused.points {
        let models: Vec<String> = p
            .submodel_prices
            .iter()
            .map(|(m, v)| format!("{m}={v:.2}"))
            .collect();
        println!(
            "#{:<2} {:>5} {:?} hist={:?} short={:?} ens={:?} [{}]",
            p.ordinal,
            p.label,
            p.zone,
            p.historical,
            p.short_forecast,
            p.ensemble_price,
            models.join(" ")
        );
    }

    // 4. "Expected price in N days" widgets.
    for h in &fused.horizons {
        if let Some(s) = fused.summary(h.horizon_days) {
            println!(
                "in {:>2}d: {:.2} ({:+.2}%){}",
                s.horizon_days,
                s.price,
                s.change_percent,
                s.confidence
                    .map(|(lo, hi)| format!(" band {lo:.2}-{hi:.2}"))
                    .unwrap_or_default()
            );
        }
    }

    // 5. Overlay the fixture hybrid forecast (no HTTP endpoint serves it).
    let mock = augur_mock::MockSource::new();
    if let Ok(hybrid) = mock.hybrid_forecast(symbol) {
        let mut payloads = normalized.payloads.clone();
        payloads.extend(payload::from_hybrid(&hybrid).payloads);
        let blended = fuse(&base, &payloads, current);
        if let Some(s) = blended.summary(5) {
            println!(
                "5d hybrid: ML {:.2} · AI-adjusted {:.2}",
                s.ml_price.unwrap_or(f64::NAN),
                s.hybrid_price.unwrap_or(f64::NAN)
            );
        }
    }

    let actuals = base.iter().filter(|e| e.kind == EntryKind::Actual).count();
    println!("{actuals} observed entries fed the chart");
    Ok(())
}
