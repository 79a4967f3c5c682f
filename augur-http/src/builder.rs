use std::time::Duration;

use augur_core::AugurError;
use url::Url;

use crate::HttpQuoteSource;
use crate::adapter::RealAdapter;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_USER_AGENT: &str = concat!("augur-http/", env!("CARGO_PKG_VERSION"));

/// Builder for [`HttpQuoteSource`].
///
/// Only `base_url` is required. The prediction service shares it unless
/// `ml_url` is set.
#[derive(Debug, Default)]
pub struct HttpQuoteSourceBuilder {
    base_url: Option<String>,
    ml_url: Option<String>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    client: Option<reqwest::Client>,
}

impl HttpQuoteSource {
    /// Returns an unconfigured builder.
    #[must_use]
    pub fn builder() -> HttpQuoteSourceBuilder {
        HttpQuoteSourceBuilder::default()
    }
}

fn parse_base(raw: &str, what: &str) -> Result<Url, AugurError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| AugurError::InvalidArg(format!("{what} `{raw}`: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(AugurError::InvalidArg(format!(
            "{what} `{raw}`: unsupported scheme `{other}`"
        ))),
    }
}

impl HttpQuoteSourceBuilder {
    /// Base URL hosting `quote/{symbol}`.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Base URL of the prediction service, when it lives elsewhere.
    #[must_use]
    pub fn ml_url(mut self, url: impl Into<String>) -> Self {
        self.ml_url = Some(url.into());
        self
    }

    /// Per-request timeout (default 5s).
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// User agent for the default client. Ignored with [`Self::client`].
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Use a preconfigured `reqwest::Client`.
    #[must_use]
    pub fn client(mut self, client: reqwest::Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Validate and build the source.
    ///
    /// # Errors
    /// Returns `InvalidArg` for a missing or non-http(s) URL or a zero
    /// timeout, and `Other` if the default client cannot be constructed.
    pub fn build(self) -> Result<HttpQuoteSource, AugurError> {
        let raw = self
            .base_url
            .ok_or_else(|| AugurError::InvalidArg("base_url is required".into()))?;
        let quote_base = parse_base(&raw, "base_url")?;
        let ml_base = match self.ml_url.as_deref() {
            Some(ml) => parse_base(ml, "ml_url")?,
            None => quote_base.clone(),
        };

        let timeout = self.timeout.unwrap_or(DEFAULT_TIMEOUT);
        if timeout.is_zero() {
            return Err(AugurError::InvalidArg("timeout must be positive".into()));
        }

        let client = match self.client {
            Some(c) => c,
            None => reqwest::Client::builder()
                .user_agent(self.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT))
                .build()
                .map_err(|e| AugurError::Other(format!("http client: {e}")))?,
        };

        let adapter = RealAdapter::new(client, quote_base, ml_base, timeout);
        Ok(HttpQuoteSource::from_adapter(&adapter))
    }
}
