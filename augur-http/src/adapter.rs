#[cfg(feature = "test-adapters")]
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use augur_core::{AugurError, EnsembleResponse, IntradayForecast, QuoteTick, payload};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::SOURCE_NAME;

/// Body of `POST /predict/price`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricePredictionRequest {
    /// Ticker the forecast is for.
    pub symbol: String,
    /// Daily closes, oldest first.
    pub historical_prices: Vec<f64>,
    /// Latest live price.
    pub current_price: f64,
}

/// Body of `POST /predict/intraday`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntradayPredictionRequest {
    /// Ticker the forecast is for.
    pub symbol: String,
    /// Recent ticks, oldest first.
    pub recent_prices: Vec<f64>,
    /// Spacing between the ticks.
    pub interval_seconds: u32,
}

/// Reply of `GET /health` on the prediction service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ServiceHealth {
    /// `"healthy"` when the service is up.
    #[serde(default)]
    pub status: String,
    /// Models the ensemble is built from.
    #[serde(default)]
    pub models: Vec<String>,
    /// Number of cached forecasts.
    #[serde(default)]
    pub cache_size: Option<u64>,
}

impl ServiceHealth {
    /// `true` when the service reports itself healthy.
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy")
    }
}

/// Quote endpoint abstraction (so we can inject mocks in tests).
#[async_trait]
pub trait HttpQuotes: Send + Sync {
    /// Fetch one quote for `symbol`.
    async fn fetch(&self, symbol: &str) -> Result<QuoteTick, AugurError>;
}

/// Prediction service abstraction.
///
/// `health` defaults to unsupported so tests can override only what they need.
#[async_trait]
pub trait HttpForecasts: Send + Sync {
    /// Request the multi-horizon ensemble forecast.
    async fn predict_price(
        &self,
        req: &PricePredictionRequest,
    ) -> Result<EnsembleResponse, AugurError>;

    /// Request the intraday forecast.
    async fn predict_intraday(
        &self,
        req: &IntradayPredictionRequest,
    ) -> Result<IntradayForecast, AugurError>;

    /// Probe service health. Default returns an error.
    async fn health(&self) -> Result<ServiceHealth, AugurError> {
        Err(AugurError::Other("health check unsupported".into()))
    }
}

/// Real adapter backed by a single `reqwest::Client`.
/// `Client` is `Clone + Send + Sync` and pools connections internally.
#[derive(Clone, Debug)]
pub struct RealAdapter {
    client: Client,
    quote_base: Url,
    ml_base: Url,
    timeout: Duration,
}

impl RealAdapter {
    /// Wrap an existing client.
    ///
    /// `quote_base` hosts `quote/{symbol}`; `ml_base` hosts `predict/*` and
    /// `health`. The timeout is applied to every request.
    #[must_use]
    pub const fn new(client: Client, quote_base: Url, ml_base: Url, timeout: Duration) -> Self {
        Self {
            client,
            quote_base,
            ml_base,
            timeout,
        }
    }

    /// Base URL of the quote endpoint.
    #[must_use]
    pub const fn quote_base(&self) -> &Url {
        &self.quote_base
    }

    /// Base URL of the prediction service.
    #[must_use]
    pub const fn ml_base(&self) -> &Url {
        &self.ml_base
    }

    /// Per-request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    fn timeout_ms(&self) -> u64 {
        u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX)
    }

    /// Send `req` and return the body of a 2xx reply.
    ///
    /// Non-2xx replies are mapped through [`map_status`], using the body's
    /// `error` or `detail` field as the message when there is one.
    async fn send(&self, req: RequestBuilder, context: &str) -> Result<String, AugurError> {
        let resp = req
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| map_transport_err(&e, self.timeout_ms(), context))?;
        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| map_transport_err(&e, self.timeout_ms(), context))?;
        if status.is_success() {
            return Ok(body);
        }
        let msg = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(ErrorBody::message);
        Err(map_status(status, msg.as_deref(), context))
    }
}

/// Append path segments to `base`, percent-encoding each one.
///
/// # Errors
/// Returns `InvalidArg` when `base` cannot carry a path (e.g. `mailto:`).
pub fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, AugurError> {
    let mut url = base.clone();
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|()| AugurError::InvalidArg(format!("base url `{base}` cannot carry a path")))?;
        path.pop_if_empty().extend(segments);
    }
    Ok(url)
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    detail: Option<serde_json::Value>,
}

impl ErrorBody {
    fn message(self) -> Option<String> {
        self.error.or_else(|| {
            self.detail.map(|d| match d {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            })
        })
    }
}

fn with_message(context: &str, msg: Option<&str>) -> String {
    match msg {
        Some(m) if !m.trim().is_empty() => format!("{context}: {m}"),
        _ => context.to_string(),
    }
}

/// Map a non-2xx status to the workspace error type.
#[must_use]
pub fn map_status(status: StatusCode, msg: Option<&str>, context: &str) -> AugurError {
    match status {
        StatusCode::NOT_FOUND => AugurError::not_found(context.to_string()),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            AugurError::InvalidArg(with_message(context, msg))
        }
        StatusCode::TOO_MANY_REQUESTS => AugurError::quote_fetch(
            SOURCE_NAME,
            format!("rate limit: {}", with_message(context, msg)),
        ),
        s if s.is_server_error() => AugurError::quote_fetch(
            SOURCE_NAME,
            format!("server error {}: {}", s.as_u16(), with_message(context, msg)),
        ),
        s => AugurError::quote_fetch(
            SOURCE_NAME,
            format!("status {}: {}", s.as_u16(), with_message(context, msg)),
        ),
    }
}

fn map_transport_err(e: &reqwest::Error, timeout_ms: u64, context: &str) -> AugurError {
    if e.is_timeout() {
        return AugurError::source_timeout(SOURCE_NAME, timeout_ms);
    }
    if let Some(status) = e.status() {
        return map_status(status, None, context);
    }
    AugurError::quote_fetch(SOURCE_NAME, format!("{context}: {e}"))
}

#[async_trait]
impl HttpQuotes for RealAdapter {
    async fn fetch(&self, symbol: &str) -> Result<QuoteTick, AugurError> {
        let context = format!("quote for {symbol}");
        let url = endpoint(&self.quote_base, &["quote", symbol])?;
        let body = self.send(self.client.get(url), &context).await?;
        serde_json::from_str(&body).map_err(|e| {
            AugurError::quote_fetch(SOURCE_NAME, format!("{context}: undecodable body: {e}"))
        })
    }
}

#[async_trait]
impl HttpForecasts for RealAdapter {
    async fn predict_price(
        &self,
        req: &PricePredictionRequest,
    ) -> Result<EnsembleResponse, AugurError> {
        let context = format!("price forecast for {}", req.symbol);
        let url = endpoint(&self.ml_base, &["predict", "price"])?;
        let body = self.send(self.client.post(url).json(req), &context).await?;
        payload::parse_ensemble(&body)
    }

    async fn predict_intraday(
        &self,
        req: &IntradayPredictionRequest,
    ) -> Result<IntradayForecast, AugurError> {
        let context = format!("intraday forecast for {}", req.symbol);
        let url = endpoint(&self.ml_base, &["predict", "intraday"])?;
        let body = self.send(self.client.post(url).json(req), &context).await?;
        serde_json::from_str(&body)
            .map_err(|e| AugurError::Data(format!("intraday response: {e}")))
    }

    async fn health(&self) -> Result<ServiceHealth, AugurError> {
        let url = endpoint(&self.ml_base, &["health"])?;
        let body = self.send(self.client.get(url), "health").await?;
        serde_json::from_str(&body).map_err(|e| AugurError::Data(format!("health response: {e}")))
    }
}

#[cfg(feature = "test-adapters")]
impl dyn HttpQuotes {
    /// Test helper that builds an `HttpQuotes` from a closure over the symbol.
    pub fn from_fn<F>(f: F) -> Arc<dyn HttpQuotes>
    where
        F: Send + Sync + 'static + Fn(String) -> Result<QuoteTick, AugurError>,
    {
        struct FnQuotes<F>(F);
        #[async_trait]
        impl<F> HttpQuotes for FnQuotes<F>
        where
            F: Send + Sync + 'static + Fn(String) -> Result<QuoteTick, AugurError>,
        {
            async fn fetch(&self, symbol: &str) -> Result<QuoteTick, AugurError> {
                (self.0)(symbol.to_string())
            }
        }
        Arc::new(FnQuotes(f))
    }
}

#[cfg(feature = "test-adapters")]
impl dyn HttpForecasts {
    /// Test helper that builds an `HttpForecasts` from one closure per endpoint.
    pub fn from_fns<P, I>(price: P, intraday: I) -> Arc<dyn HttpForecasts>
    where
        P: Send
            + Sync
            + 'static
            + Fn(PricePredictionRequest) -> Result<EnsembleResponse, AugurError>,
        I: Send
            + Sync
            + 'static
            + Fn(IntradayPredictionRequest) -> Result<IntradayForecast, AugurError>,
    {
        struct FnForecasts<P, I> {
            price: P,
            intraday: I,
        }
        #[async_trait]
        impl<P, I> HttpForecasts for FnForecasts<P, I>
        where
            P: Send
                + Sync
                + 'static
                + Fn(PricePredictionRequest) -> Result<EnsembleResponse, AugurError>,
            I: Send
                + Sync
                + 'static
                + Fn(IntradayPredictionRequest) -> Result<IntradayForecast, AugurError>,
        {
            async fn predict_price(
                &self,
                req: &PricePredictionRequest,
            ) -> Result<EnsembleResponse, AugurError> {
                (self.price)(req.clone())
            }

            async fn predict_intraday(
                &self,
                req: &IntradayPredictionRequest,
            ) -> Result<IntradayForecast, AugurError> {
                (self.intraday)(req.clone())
            }
        }
        Arc::new(FnForecasts { price, intraday })
    }
}

/// Hands out shared adapter handles; override only the endpoints a test needs.
#[cfg(feature = "test-adapters")]
pub trait CloneArcAdapters {
    /// Clone as `Arc<dyn HttpQuotes>`.
    fn clone_arc_quotes(&self) -> Arc<dyn HttpQuotes> {
        <dyn HttpQuotes>::from_fn(|_| Err(AugurError::Other("quote unsupported".into())))
    }
    /// Clone as `Arc<dyn HttpForecasts>`.
    fn clone_arc_forecasts(&self) -> Arc<dyn HttpForecasts> {
        <dyn HttpForecasts>::from_fns(
            |_| Err(AugurError::Other("price forecast unsupported".into())),
            |_| Err(AugurError::Other("intraday forecast unsupported".into())),
        )
    }
}

#[cfg(feature = "test-adapters")]
impl CloneArcAdapters for RealAdapter {
    fn clone_arc_quotes(&self) -> Arc<dyn HttpQuotes> {
        Arc::new(self.clone()) as Arc<dyn HttpQuotes>
    }
    fn clone_arc_forecasts(&self) -> Arc<dyn HttpForecasts> {
        Arc::new(self.clone()) as Arc<dyn HttpForecasts>
    }
}
