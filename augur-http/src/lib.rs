//! augur-http
//!
//! Quote source and forecast client over plain JSON HTTP. Quotes come from
//! `GET {base}/quote/{symbol}`; forecasts come from the prediction service's
//! `POST /predict/price` and `POST /predict/intraday`.
#![warn(missing_docs)]

/// Adapter definitions and the production adapter backed by `reqwest`.
pub mod adapter;
mod builder;

use std::sync::Arc;

#[cfg(feature = "test-adapters")]
use adapter::CloneArcAdapters;
#[cfg(not(feature = "test-adapters"))]
use adapter::RealAdapter;
use adapter::{
    HttpForecasts, HttpQuotes, IntradayPredictionRequest, PricePredictionRequest, ServiceHealth,
};
use async_trait::async_trait;
use augur_core::{
    AugurError, EnsembleResponse, ForecastSource, IntradayForecast, QuoteSource, QuoteTick,
};

pub use builder::HttpQuoteSourceBuilder;

const SOURCE_NAME: &str = "augur-http";

#[cfg(not(feature = "test-adapters"))]
type QuotesAdapter = Arc<RealAdapter>;
#[cfg(feature = "test-adapters")]
type QuotesAdapter = Arc<dyn HttpQuotes>;

#[cfg(not(feature = "test-adapters"))]
type ForecastsAdapter = Arc<RealAdapter>;
#[cfg(feature = "test-adapters")]
type ForecastsAdapter = Arc<dyn HttpForecasts>;

/// Public source type. Construct with [`HttpQuoteSource::builder`] or
/// [`HttpQuoteSource::new`].
pub struct HttpQuoteSource {
    quotes: QuotesAdapter,
    forecasts: ForecastsAdapter,
}

impl HttpQuoteSource {
    /// Name reported through [`QuoteSource::name`] and error tags.
    pub const NAME: &'static str = SOURCE_NAME;

    fn looks_like_not_found(msg: &str) -> bool {
        let m = msg.to_ascii_lowercase();
        m.contains("not found") || m.contains("no data") || m.contains("unknown symbol")
    }

    fn normalize_error(e: AugurError, what: &str) -> AugurError {
        match e {
            AugurError::QuoteFetch { source_name: _, msg } => {
                if Self::looks_like_not_found(&msg) {
                    AugurError::not_found(what.to_string())
                } else {
                    AugurError::quote_fetch(SOURCE_NAME, msg)
                }
            }
            AugurError::Other(msg) => AugurError::quote_fetch(SOURCE_NAME, msg),
            other => other,
        }
    }

    /// Build with a fresh client pointed at `base_url` and default settings.
    ///
    /// # Errors
    /// Returns `InvalidArg` if `base_url` does not parse as an http(s) URL.
    pub fn new(base_url: impl Into<String>) -> Result<Self, AugurError> {
        Self::builder().base_url(base_url).build()
    }

    /// For tests/injection (requires the `test-adapters` feature).
    ///
    /// Accepts a borrowed adapter to avoid unnecessary moves.
    #[cfg(feature = "test-adapters")]
    pub fn from_adapter<A: CloneArcAdapters + 'static>(adapter: &A) -> Self {
        Self {
            quotes: adapter.clone_arc_quotes(),
            forecasts: adapter.clone_arc_forecasts(),
        }
    }

    #[cfg(not(feature = "test-adapters"))]
    /// Build from a concrete `RealAdapter` by cloning it into shared handles.
    pub fn from_adapter(adapter: &RealAdapter) -> Self {
        let shared = Arc::new(adapter.clone());
        Self {
            quotes: Arc::clone(&shared),
            forecasts: shared,
        }
    }

    /// Probe the prediction service.
    ///
    /// # Errors
    /// Propagates transport and status errors from the health endpoint.
    pub async fn health(&self) -> Result<ServiceHealth, AugurError> {
        self.forecasts
            .health()
            .await
            .map_err(|e| Self::normalize_error(e, "prediction service"))
    }
}

#[async_trait]
impl QuoteSource for HttpQuoteSource {
    fn name(&self) -> &'static str {
        SOURCE_NAME
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "augur_http::fetch_quote", skip(self), err)
    )]
    async fn fetch_quote(&self, symbol: &str) -> Result<QuoteTick, AugurError> {
        let symbol = symbol.trim();
        if symbol.is_empty() {
            return Err(AugurError::InvalidArg("symbol must not be empty".into()));
        }
        self.quotes
            .fetch(symbol)
            .await
            .map_err(|e| Self::normalize_error(e, &format!("quote for {symbol}")))
    }
}

#[async_trait]
impl ForecastSource for HttpQuoteSource {
    fn name(&self) -> &'static str {
        SOURCE_NAME
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "augur_http::ensemble_forecast",
            skip(self, historical_prices),
            fields(points = historical_prices.len()),
            err,
        )
    )]
    async fn ensemble_forecast(
        &self,
        symbol: &str,
        historical_prices: &[f64],
        current_price: f64,
    ) -> Result<EnsembleResponse, AugurError> {
        if !current_price.is_finite() {
            return Err(AugurError::InvalidArg(format!(
                "current price must be finite, got {current_price}"
            )));
        }
        if historical_prices.iter().any(|p| !p.is_finite()) {
            return Err(AugurError::InvalidArg(
                "historical prices must all be finite".into(),
            ));
        }
        let req = PricePredictionRequest {
            symbol: symbol.trim().to_string(),
            historical_prices: historical_prices.to_vec(),
            current_price,
        };
        self.forecasts
            .predict_price(&req)
            .await
            .map_err(|e| Self::normalize_error(e, &format!("price forecast for {}", req.symbol)))
    }

    async fn intraday_forecast(
        &self,
        symbol: &str,
        recent_prices: &[f64],
        interval_seconds: u32,
    ) -> Result<IntradayForecast, AugurError> {
        if interval_seconds == 0 {
            return Err(AugurError::InvalidArg(
                "interval_seconds must be positive".into(),
            ));
        }
        if recent_prices.iter().any(|p| !p.is_finite()) {
            return Err(AugurError::InvalidArg(
                "recent prices must all be finite".into(),
            ));
        }
        let req = IntradayPredictionRequest {
            symbol: symbol.trim().to_string(),
            recent_prices: recent_prices.to_vec(),
            interval_seconds,
        };
        self.forecasts
            .predict_intraday(&req)
            .await
            .map_err(|e| {
                Self::normalize_error(e, &format!("intraday forecast for {}", req.symbol))
            })
    }
}
