use std::sync::Arc;

use augur::{ForecastSource, QuoteSource};
use tracing_subscriber::EnvFilter;

const DEFAULT_API_URL: &str = "http://localhost:8000";

fn use_mock() -> bool {
    std::env::var("AUGUR_EXAMPLES_USE_MOCK").is_ok()
}

fn http_source() -> augur_http::HttpQuoteSource {
    let base = std::env::var("AUGUR_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
    let mut builder = augur_http::HttpQuoteSource::builder().base_url(base);
    if let Ok(ml) = std::env::var("AUGUR_ML_URL") {
        builder = builder.ml_url(ml);
    }
    match builder.build() {
        Ok(src) => src,
        Err(e) => panic!("invalid AUGUR_API_URL / AUGUR_ML_URL: {e}"),
    }
}

/// Install a `fmt` subscriber honoring `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}

#[allow(dead_code)]
#[must_use]
pub fn get_source() -> Arc<dyn QuoteSource> {
    if use_mock() {
        println!("--- (Using Mock Source for CI) ---");
        Arc::new(augur_mock::MockSource::new())
    } else {
        Arc::new(http_source())
    }
}

#[allow(dead_code)]
#[must_use]
pub fn get_forecasts() -> Arc<dyn ForecastSource> {
    if use_mock() {
        Arc::new(augur_mock::MockSource::new())
    } else {
        Arc::new(http_source())
    }
}
