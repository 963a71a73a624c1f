//! Covalent `xy=k` API client
//!
//! This module fetches DEX data (health, ecosystem charts, pools, tokens and
//! transactions) from the Covalent REST API. Every request goes through a
//! shared concurrency limit, a per-request timeout and a bounded retry with
//! exponential backoff.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use super::markets::Market;
use super::pagination::{self, Page, PageSource};

/// Base URL for the Covalent API
pub const DEFAULT_BASE_URL: &str = "https://api.covalenthq.com/v1";

/// Errors that can occur when talking to the upstream API
#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection, timeout or transport failure
    ///
    /// Built through `From`, which strips the request URL: it carries the
    /// API key.
    #[error("HTTP request failed: {0}")]
    Network(reqwest::Error),

    /// Non-2xx status or an error payload from the API
    #[error("Upstream error {status}: {message}")]
    Upstream { status: u16, message: String },

    /// Failed to parse JSON response
    #[error("Failed to parse API response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Network(err.without_url())
    }
}

impl ApiError {
    /// Whether repeating the same request may succeed
    ///
    /// Transport failures, rate limiting (429) and server errors (5xx) are
    /// retried. Client errors and malformed payloads are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Network(e) => !e.is_decode() && !e.is_builder(),
            ApiError::Upstream { status, .. } => *status == 429 || *status >= 500,
            ApiError::Decode(_) => false,
        }
    }
}

/// Bounded retry with exponential backoff
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry
    pub base_delay: Duration,
    /// Upper bound for any single delay
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (1-based): `base_delay * 2^(attempt-1)`
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.base_delay
            .saturating_mul(1u32 << exponent)
            .min(self.max_delay)
    }
}

/// Settings for `CovalentClient`
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub api_key: String,
    /// Items requested per page
    pub page_size: u32,
    /// Safety bound on pages fetched per aggregation
    pub max_pages: u32,
    /// Timeout applied to each outbound request
    pub request_timeout: Duration,
    /// Cap on requests in flight at once
    pub max_concurrent_requests: usize,
    pub retry: RetryPolicy,
}

impl ApiConfig {
    /// Creates a configuration with default limits for the given API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            page_size: 100,
            max_pages: 50,
            request_timeout: Duration::from_secs(30),
            max_concurrent_requests: 4,
            retry: RetryPolicy::default(),
        }
    }
}

/// Response envelope shared by every Covalent endpoint
#[derive(Debug, Deserialize)]
struct ApiEnvelope {
    data: Option<Page>,
    #[serde(default)]
    error: bool,
    error_message: Option<String>,
    error_code: Option<u16>,
}

/// Client for fetching DEX data from the Covalent API
#[derive(Debug, Clone)]
pub struct CovalentClient {
    http: Client,
    config: Arc<ApiConfig>,
    permits: Arc<Semaphore>,
}

impl CovalentClient {
    /// Creates a client from the given configuration
    ///
    /// # Returns
    /// * `Ok(CovalentClient)` on success
    /// * `Err(ApiError::Network)` if the HTTP client cannot be built
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self::with_client(http, config))
    }

    /// Creates a client with a custom HTTP client
    pub fn with_client(http: Client, config: ApiConfig) -> Self {
        let permits = Arc::new(Semaphore::new(config.max_concurrent_requests.max(1)));
        Self {
            http,
            config: Arc::new(config),
            permits,
        }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Builds the request URL for one page of `path`
    ///
    /// The result carries the API key and must never be logged.
    fn page_url(&self, path: &str, page_number: u32) -> String {
        format!(
            "{}/{}/?&page-number={}&page-size={}&key={}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_matches('/'),
            page_number,
            self.config.page_size,
            self.config.api_key
        )
    }

    /// Fetches one page, retrying transient failures
    async fn get_page(&self, path: &str, page_number: u32) -> Result<Page, ApiError> {
        let retry = &self.config.retry;
        let mut attempt = 0;

        loop {
            match self.request_page(path, page_number).await {
                Ok(page) => return Ok(page),
                Err(err) if err.is_retryable() && attempt < retry.max_retries => {
                    attempt += 1;
                    let wait = retry.delay_for(attempt);
                    warn!(
                        path,
                        page_number,
                        attempt,
                        max_retries = retry.max_retries,
                        ?wait,
                        error = %err,
                        "request failed, retrying"
                    );
                    tokio::time::sleep(wait).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Performs a single GET for one page
    async fn request_page(&self, path: &str, page_number: u32) -> Result<Page, ApiError> {
        // The semaphore is never closed, so acquire only fails if that changes
        let _permit = self.permits.acquire().await.ok();

        debug!(path, page_number, "GET");
        let response = self.http.get(self.page_url(path, page_number)).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(upstream_error(status.as_u16(), &text));
        }

        parse_envelope(&text)
    }

    /// Health status of the DEX; returns the latest synced block
    pub async fn dex_health(&self, market: Market) -> Result<Page, ApiError> {
        self.get_page(&endpoint_path(market, "health"), 0).await
    }

    /// Ecosystem data: total volume and liquidity charts plus 24h/7d KPIs
    pub async fn dex_ecosystem(&self, market: Market) -> Result<Page, ApiError> {
        self.get_page(&endpoint_path(market, "ecosystem"), 0).await
    }

    /// Every pool of the DEX, following pagination to the last page
    pub async fn dex_pools(&self, market: Market) -> Result<Page, ApiError> {
        let path = endpoint_path(market, "pools");
        pagination::fetch_all(self, &path, self.config.max_pages).await
    }

    /// One pool, including 7d and 30d volume and liquidity charts
    pub async fn pool_by_address(&self, market: Market, address: &str) -> Result<Page, ApiError> {
        let path = endpoint_path(market, &format!("pools/address/{}", address));
        self.get_page(&path, 0).await
    }

    /// Latest swap, mint and burn events of a pool
    pub async fn pool_transactions(
        &self,
        market: Market,
        address: &str,
    ) -> Result<Page, ApiError> {
        let path = endpoint_path(market, &format!("pools/address/{}/transactions", address));
        self.get_page(&path, 0).await
    }

    /// Tokens traded on the DEX
    pub async fn tokens(&self, market: Market) -> Result<Page, ApiError> {
        self.get_page(&endpoint_path(market, "tokens"), 0).await
    }

    /// One token, including volume, liquidity and price charts
    pub async fn token_by_address(&self, market: Market, address: &str) -> Result<Page, ApiError> {
        let path = endpoint_path(market, &format!("tokens/address/{}", address));
        self.get_page(&path, 0).await
    }

    /// Latest swap, mint and burn events involving a token
    pub async fn token_transactions(
        &self,
        market: Market,
        address: &str,
    ) -> Result<Page, ApiError> {
        let path = endpoint_path(market, &format!("tokens/address/{}/transactions", address));
        self.get_page(&path, 0).await
    }

    /// LP balances held by a wallet address
    pub async fn address_balances(&self, market: Market, address: &str) -> Result<Page, ApiError> {
        let path = endpoint_path(market, &format!("address/{}/balances", address));
        self.get_page(&path, 0).await
    }

    /// Liquidity transactions made by a wallet address
    pub async fn address_transactions(
        &self,
        market: Market,
        address: &str,
    ) -> Result<Page, ApiError> {
        let path = endpoint_path(market, &format!("address/{}/transactions", address));
        self.get_page(&path, 0).await
    }
}

impl PageSource for CovalentClient {
    async fn fetch_page(&self, path: &str, page_number: u32) -> Result<Page, ApiError> {
        self.get_page(path, page_number).await
    }
}

/// Path of an `xy=k` endpoint, e.g. `1/xy=k/sushiswap/pools`
pub fn endpoint_path(market: Market, suffix: &str) -> String {
    format!("{}/{}", market.path_prefix(), suffix.trim_matches('/'))
}

/// Parses a successful response body into its data page
fn parse_envelope(text: &str) -> Result<Page, ApiError> {
    let envelope: ApiEnvelope = serde_json::from_str(text)?;

    if envelope.error {
        return Err(ApiError::Upstream {
            status: envelope.error_code.unwrap_or(502),
            message: envelope
                .error_message
                .unwrap_or_else(|| "unknown upstream error".to_string()),
        });
    }

    envelope.data.ok_or_else(|| ApiError::Upstream {
        status: 502,
        message: "response has no data block".to_string(),
    })
}

/// Builds an `Upstream` error from a non-2xx response
///
/// Uses the API's `error_message` when the body carries one.
fn upstream_error(status: u16, body: &str) -> ApiError {
    let message = serde_json::from_str::<ApiEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.error_message)
        .unwrap_or_else(|| body.chars().take(200).collect());

    ApiError::Upstream { status, message }
}
