//! Mock quote and forecast sources for tests and examples.
//!
//! - [`MockSource`] serves deterministic fixture data for a handful of symbols.
//! - [`DynamicMockSource`] defers every call to a [`DynamicMockController`], so
//!   tests can script returns, failures, hangs and delays per symbol.
use async_trait::async_trait;
use augur_core::connector::{ForecastSource, QuoteSource};
use augur_core::{
    AugurError, EnsembleResponse, HybridResponse, IntradayForecast, QuoteTick, ScenarioForecast,
};

mod dynamic;
mod fixtures;

pub use dynamic::{DynamicMockController, DynamicMockSource, MockBehavior};

/// Mock source for CI-safe examples. Provides deterministic data from static fixtures.
///
/// Special symbols:
/// - `FAIL`: every call fails with `QuoteFetch`.
/// - `ERROR`: the quote endpoint answers with an in-band `{"error": ...}` body.
/// - `EMPTY`: the quote endpoint answers with neither price nor error.
pub struct MockSource;

impl Default for MockSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSource {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn not_found(what: &str) -> AugurError {
        AugurError::not_found(what.to_string())
    }

    fn maybe_fail(symbol: &str, capability: &'static str) -> Result<(), AugurError> {
        match symbol {
            "FAIL" => Err(AugurError::quote_fetch(
                "augur-mock",
                format!("forced failure: {capability}"),
            )),
            _ => Ok(()),
        }
    }

    /// Fixture hybrid (sentiment-adjusted) forecast for `symbol`.
    ///
    /// # Errors
    /// Returns `NotFound` for symbols without fixtures.
    pub fn hybrid_forecast(&self, symbol: &str) -> Result<HybridResponse, AugurError> {
        Self::maybe_fail(symbol, "hybrid")?;
        fixtures::forecasts::hybrid_by_symbol(symbol)
            .ok_or_else(|| Self::not_found(&format!("hybrid forecast for {symbol}")))
    }

    /// Fixture scenario forecast for `symbol`.
    ///
    /// # Errors
    /// Returns `NotFound` for symbols without fixtures.
    pub fn scenario_forecast(&self, symbol: &str) -> Result<ScenarioForecast, AugurError> {
        Self::maybe_fail(symbol, "scenario")?;
        fixtures::forecasts::scenario_by_symbol(symbol)
            .ok_or_else(|| Self::not_found(&format!("scenario forecast for {symbol}")))
    }
}

#[async_trait]
impl QuoteSource for MockSource {
    fn name(&self) -> &'static str {
        "augur-mock"
    }

    async fn fetch_quote(&self, symbol: &str) -> Result<QuoteTick, AugurError> {
        Self::maybe_fail(symbol, "quote")?;
        match symbol {
            "ERROR" => Ok(QuoteTick::error(format!("no quote data for {symbol}"))),
            "EMPTY" => Ok(QuoteTick::default()),
            s => fixtures::quotes::by_symbol(s)
                .ok_or_else(|| Self::not_found(&format!("quote for {s}"))),
        }
    }
}

#[async_trait]
impl ForecastSource for MockSource {
    fn name(&self) -> &'static str {
        "augur-mock"
    }

    async fn ensemble_forecast(
        &self,
        symbol: &str,
        _historical_prices: &[f64],
        _current_price: f64,
    ) -> Result<EnsembleResponse, AugurError> {
        Self::maybe_fail(symbol, "ensemble")?;
        fixtures::forecasts::ensemble_by_symbol(symbol)
            .ok_or_else(|| Self::not_found(&format!("ensemble forecast for {symbol}")))
    }

    async fn intraday_forecast(
        &self,
        symbol: &str,
        _recent_prices: &[f64],
        _interval_seconds: u32,
    ) -> Result<IntradayForecast, AugurError> {
        Self::maybe_fail(symbol, "intraday")?;
        fixtures::forecasts::intraday_by_symbol(symbol)
            .ok_or_else(|| Self::not_found(&format!("intraday forecast for {symbol}")))
    }
}
