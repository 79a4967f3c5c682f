use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use augur_core::connector::{ForecastSource, QuoteSource};
use augur_core::{AugurError, EnsembleResponse, IntradayForecast, QuoteTick};

/// Instruction for how a method should behave for a given input.
#[derive(Debug, Clone)]
pub enum MockBehavior<T> {
    /// Return the provided value immediately.
    Return(T),
    /// Fail immediately with the provided error.
    Fail(AugurError),
    /// Hang indefinitely (simulate a timeout).
    Hang,
    /// Return the provided value after a delay (simulate a slow endpoint).
    Delay(Duration, T),
}

impl<T> MockBehavior<T> {
    async fn run(self) -> Result<T, AugurError> {
        match self {
            Self::Return(v) => Ok(v),
            Self::Fail(e) => Err(e),
            Self::Hang => {
                std::future::pending::<()>().await;
                unreachable!()
            }
            Self::Delay(d, v) => {
                tokio::time::sleep(d).await;
                Ok(v)
            }
        }
    }
}

#[derive(Default)]
struct InternalState {
    quote_rules: HashMap<String, MockBehavior<QuoteTick>>,
    quote_scripts: HashMap<String, VecDeque<MockBehavior<QuoteTick>>>,
    quote_requests: Vec<String>,
    ensemble_rules: HashMap<String, MockBehavior<EnsembleResponse>>,
    intraday_rules: HashMap<String, MockBehavior<IntradayForecast>>,
    forecast_requests: Vec<String>,
}

/// Controller handle used by tests to drive the dynamic mock from the outside.
#[derive(Clone)]
pub struct DynamicMockController {
    state: Arc<Mutex<InternalState>>,
}

impl DynamicMockController {
    /// Set the standing behavior for `fetch_quote` calls for a specific symbol.
    pub async fn set_quote_behavior(&self, symbol: &str, behavior: MockBehavior<QuoteTick>) {
        let mut guard = self.state.lock().await;
        guard.quote_rules.insert(symbol.to_string(), behavior);
    }

    /// Queue behaviors consumed one per `fetch_quote` call, in order.
    ///
    /// Once the script runs out, the standing behavior applies again.
    pub async fn script_quotes(
        &self,
        symbol: &str,
        script: impl IntoIterator<Item = MockBehavior<QuoteTick>>,
    ) {
        let mut guard = self.state.lock().await;
        guard
            .quote_scripts
            .entry(symbol.to_string())
            .or_default()
            .extend(script);
    }

    /// Set the behavior for `ensemble_forecast` calls for a specific symbol.
    pub async fn set_ensemble_behavior(
        &self,
        symbol: &str,
        behavior: MockBehavior<EnsembleResponse>,
    ) {
        let mut guard = self.state.lock().await;
        guard.ensemble_rules.insert(symbol.to_string(), behavior);
    }

    /// Set the behavior for `intraday_forecast` calls for a specific symbol.
    pub async fn set_intraday_behavior(
        &self,
        symbol: &str,
        behavior: MockBehavior<IntradayForecast>,
    ) {
        let mut guard = self.state.lock().await;
        guard.intraday_rules.insert(symbol.to_string(), behavior);
    }

    /// Symbols passed to `fetch_quote`, in call order.
    pub async fn quote_requests(&self) -> Vec<String> {
        self.state.lock().await.quote_requests.clone()
    }

    /// Symbols passed to the forecast methods, in call order.
    pub async fn forecast_requests(&self) -> Vec<String> {
        self.state.lock().await.forecast_requests.clone()
    }

    /// Clear all configured behaviors and request logs.
    pub async fn clear_all_behaviors(&self) {
        let mut guard = self.state.lock().await;
        guard.quote_rules.clear();
        guard.quote_scripts.clear();
        guard.quote_requests.clear();
        guard.ensemble_rules.clear();
        guard.intraday_rules.clear();
        guard.forecast_requests.clear();
    }
}

/// A source that defers all behavior to an external controller.
pub struct DynamicMockSource {
    name: &'static str,
    state: Arc<Mutex<InternalState>>,
}

impl DynamicMockSource {
    /// Create a new dynamic mock source and its controller.
    #[must_use]
    pub fn new_with_controller(name: &'static str) -> (Arc<Self>, DynamicMockController) {
        let state = Arc::new(Mutex::new(InternalState::default()));
        let controller = DynamicMockController {
            state: Arc::clone(&state),
        };
        (Arc::new(Self { name, state }), controller)
    }
}

#[async_trait]
impl QuoteSource for DynamicMockSource {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn fetch_quote(&self, symbol: &str) -> Result<QuoteTick, AugurError> {
        // Acquire behavior snapshot without holding the lock across await points
        let behavior = {
            let mut guard = self.state.lock().await;
            guard.quote_requests.push(symbol.to_string());
            let scripted = guard
                .quote_scripts
                .get_mut(symbol)
                .and_then(VecDeque::pop_front);
            scripted.or_else(|| guard.quote_rules.get(symbol).cloned())
        };

        match behavior {
            Some(b) => b.run().await,
            None => Err(AugurError::not_found(format!("quote for {symbol}"))),
        }
    }
}

#[async_trait]
impl ForecastSource for DynamicMockSource {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn ensemble_forecast(
        &self,
        symbol: &str,
        _historical_prices: &[f64],
        _current_price: f64,
    ) -> Result<EnsembleResponse, AugurError> {
        let behavior = {
            let mut guard = self.state.lock().await;
            guard.forecast_requests.push(symbol.to_string());
            guard.ensemble_rules.get(symbol).cloned()
        };
        match behavior {
            Some(b) => b.run().await,
            None => Err(AugurError::not_found(format!("ensemble forecast for {symbol}"))),
        }
    }

    async fn intraday_forecast(
        &self,
        symbol: &str,
        _recent_prices: &[f64],
        _interval_seconds: u32,
    ) -> Result<IntradayForecast, AugurError> {
        let behavior = {
            let mut guard = self.state.lock().await;
            guard.forecast_requests.push(symbol.to_string());
            guard.intraday_rules.get(symbol).cloned()
        };
        match behavior {
            Some(b) => b.run().await,
            None => Err(AugurError::not_found(format!("intraday forecast for {symbol}"))),
        }
    }
}
