use async_trait::async_trait;

use crate::AugurError;
use augur_types::{EnsembleResponse, IntradayForecast, QuoteTick};

/// Source of live quotes polled by the reconciler.
///
/// Implementations perform exactly one request per call and never retry on
/// their own; retry cadence belongs to the poll loop.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Stable name used in logs and error tags (e.g. "augur-http").
    fn name(&self) -> &'static str;

    /// Fetch one quote for `symbol`.
    ///
    /// In-band error bodies (`{"error": ...}`) are returned as `Ok` with
    /// `QuoteTick::error` set; `Err` is reserved for transport and decoding failures.
    async fn fetch_quote(&self, symbol: &str) -> Result<QuoteTick, AugurError>;
}

/// Source of already-produced ML forecasts.
#[async_trait]
pub trait ForecastSource: Send + Sync {
    /// Stable name used in logs and error tags.
    fn name(&self) -> &'static str;

    /// Fetch the multi-horizon ensemble forecast for `symbol`.
    async fn ensemble_forecast(
        &self,
        symbol: &str,
        historical_prices: &[f64],
        current_price: f64,
    ) -> Result<EnsembleResponse, AugurError>;

    /// Fetch the intraday forecast built from recent ticks.
    ///
    /// Default: unsupported.
    async fn intraday_forecast(
        &self,
        symbol: &str,
        recent_prices: &[f64],
        interval_seconds: u32,
    ) -> Result<IntradayForecast, AugurError> {
        let _ = (symbol, recent_prices, interval_seconds);
        Err(AugurError::Other(format!(
            "{} does not provide intraday forecasts",
            self.name()
        )))
    }
}
