use std::collections::BTreeMap;

use augur_core::{
    ChartDatum, EnsemblePrediction, EnsembleResponse, EnsembleWeights, HybridPrediction,
    HybridResponse, IntradayForecast, IntradayPrediction, LenientF64, ScenarioBucket,
    ScenarioForecast,
};

use super::quotes;

const HORIZONS: [u32; 4] = [1, 5, 10, 30];
// Per-day drift of each submodel, as a fraction of the current price.
const MODELS: [(&str, f64); 3] = [("lstm", 0.0012), ("rf", 0.0008), ("lr", 0.0005)];

fn current(s: &str) -> Option<f64> {
    quotes::by_symbol(s).and_then(|q| q.price)
}

pub fn weights() -> EnsembleWeights {
    EnsembleWeights::new()
        .with("lstm", 0.5)
        .with("rf", 0.3)
        .with("lr", 0.2)
}

pub fn ensemble_by_symbol(s: &str) -> Option<EnsembleResponse> {
    let cp = current(s)?;
    let w = weights();

    let mut model_predictions = BTreeMap::new();
    for (model, drift) in MODELS {
        let daily = (1..=30)
            .map(|d| LenientF64(round2(cp * (1.0 + drift * f64::from(d)))))
            .collect();
        model_predictions.insert(model.to_string(), daily);
    }

    let mut predictions = BTreeMap::new();
    for h in HORIZONS {
        let blended: f64 = MODELS
            .iter()
            .map(|(m, drift)| w.get(m).unwrap_or(0.0) * cp * (1.0 + drift * f64::from(h)))
            .sum();
        let price = round2(blended);
        let spread = cp * 0.004 * f64::from(h).sqrt();
        predictions.insert(
            format!("next_{h}d"),
            EnsemblePrediction {
                price: Some(price),
                change_pct: Some(round2((price - cp) / cp * 100.0)),
                confidence: Some(vec![
                    LenientF64(round2(price - spread)),
                    LenientF64(round2(price + spread)),
                ]),
            },
        );
    }

    let mut chart_data: Vec<ChartDatum> = (-10i32..0)
        .map(|day| ChartDatum {
            day: i64::from(day),
            price: Some(round2(cp * (1.0 + 0.001 * f64::from(day)))),
            kind: "historical".to_string(),
            upper: None,
            lower: None,
        })
        .collect();
    chart_data.push(ChartDatum {
        day: 0,
        price: Some(cp),
        kind: "current".to_string(),
        upper: None,
        lower: None,
    });
    if let Some(next) = predictions.get("next_1d").and_then(|p| p.price) {
        chart_data.push(ChartDatum {
            day: 1,
            price: Some(next),
            kind: "predicted".to_string(),
            upper: Some(round2(next * 1.004)),
            lower: Some(round2(next * 0.996)),
        });
    }

    Some(EnsembleResponse {
        symbol: s.to_string(),
        current_price: Some(cp),
        chart_data,
        predictions,
        model_weights: Some(w),
        model_predictions,
        cached: false,
    })
}

pub fn hybrid_by_symbol(s: &str) -> Option<HybridResponse> {
    let ensemble = ensemble_by_symbol(s)?;
    let predictions = ensemble
        .predictions
        .iter()
        .filter_map(|(k, p)| {
            let ml = p.price?;
            // Mildly bullish sentiment.
            let adjustment = round2(ml * 0.002);
            Some((
                k.clone(),
                HybridPrediction {
                    price: Some(round2(ml + adjustment)),
                    change_pct: p.change_pct,
                    ml_price: Some(ml),
                    ai_price: Some(round2(ml * 1.01)),
                    adjustment: Some(adjustment),
                },
            ))
        })
        .collect();
    Some(HybridResponse {
        symbol: Some(s.to_string()),
        predictions,
    })
}

pub fn scenario_by_symbol(s: &str) -> Option<ScenarioForecast> {
    let cp = current(s)?;
    let bucket = |pct: f64, timeframe: &str| {
        let price = round2(cp * (1.0 + pct / 100.0));
        Some(ScenarioBucket {
            price: Some(price),
            change: Some(round2(price - cp)),
            change_percent: Some(pct),
            timeframe: Some(timeframe.to_string()),
        })
    };
    Some(ScenarioForecast {
        short_term: bucket(1.5, "1-2 weeks"),
        one_month: bucket(3.0, "1 month"),
        three_month: bucket(6.0, "3 months"),
        long_term: bucket(12.0, "6-12 months"),
    })
}

pub fn intraday_by_symbol(s: &str) -> Option<IntradayForecast> {
    let cp = current(s)?;
    let predictions = [(5u32, 0.0004), (15, 0.0009), (30, 0.0015)]
        .into_iter()
        .map(|(m, drift)| {
            let price = round2(cp * (1.0 + drift));
            (
                format!("{m}min"),
                IntradayPrediction {
                    price: Some(price),
                    upper: Some(round2(price * 1.002)),
                    lower: Some(round2(price * 0.998)),
                    direction: Some("up".to_string()),
                    change_pct: Some(round2(drift * 100.0)),
                },
            )
        })
        .collect();
    Some(IntradayForecast {
        symbol: s.to_string(),
        current_price: Some(cp),
        predictions,
    })
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
