//! Alpha Vantage API client
//!
//! Raw provider access only: each operation returns the provider's JSON
//! shape untouched. Field mapping and derivation live in
//! [`crate::finance::client`].

use crate::error::{AdvisorError, Result};
use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::Client;
use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

const BASE_URL: &str = "https://www.alphavantage.co/query";

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// The four provider reads the advisor consumes
///
/// Implementations return the provider's raw JSON; an equivalent provider
/// can be substituted as long as it reproduces the same field names (or
/// the client is taught its dialect).
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Latest quote for a symbol (`"Global Quote"` shape)
    async fn global_quote(&self, symbol: &str) -> Result<serde_json::Value>;

    /// Full daily time series (`"Time Series (Daily)"` shape)
    async fn daily_series(&self, symbol: &str) -> Result<serde_json::Value>;

    /// Company/fund overview
    async fn overview(&self, symbol: &str) -> Result<serde_json::Value>;

    /// Sector performance table (`"Rank A: Real-Time Performance"` shape)
    async fn sector_performance(&self) -> Result<serde_json::Value>;
}

/// Alpha Vantage API client
#[derive(Debug, Clone)]
pub struct AlphaVantageClient {
    client: Client,
    api_key: String,
    timeout: Duration,
    rate_limiter: SharedRateLimiter,
}

impl AlphaVantageClient {
    /// Create a new Alpha Vantage client
    ///
    /// # Arguments
    /// * `api_key` - Alpha Vantage API key
    /// * `rate_limit` - Maximum requests per minute (free tier: 5)
    /// * `timeout` - Per-request timeout
    pub fn new(api_key: impl Into<String>, rate_limit: u32, timeout: Duration) -> Self {
        let quota =
            Quota::per_minute(NonZeroU32::new(rate_limit).unwrap_or(NonZeroU32::new(5).unwrap()));
        let rate_limiter = Arc::new(RateLimiter::direct(quota));

        Self {
            client: Client::new(),
            api_key: api_key.into(),
            timeout,
            rate_limiter,
        }
    }

    async fn query(&self, params: &HashMap<&str, &str>) -> Result<serde_json::Value> {
        // Wait for rate limiter
        self.rate_limiter.until_ready().await;

        let response = self
            .client
            .get(BASE_URL)
            .timeout(self.timeout)
            .query(params)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AdvisorError::ProviderUnavailable(format!(
                "HTTP error: {}",
                response.status()
            )));
        }

        let data: serde_json::Value = response.json().await?;

        // Check for API error messages
        if let Some(error) = data.get("Error Message") {
            return Err(AdvisorError::ProviderUnavailable(error.to_string()));
        }

        // A "Note" payload means the request quota was exhausted
        if let Some(note) = data.get("Note") {
            return Err(AdvisorError::ProviderUnavailable(format!(
                "rate limited: {note}"
            )));
        }

        Ok(data)
    }
}

#[async_trait]
impl MarketDataSource for AlphaVantageClient {
    async fn global_quote(&self, symbol: &str) -> Result<serde_json::Value> {
        let mut params = HashMap::new();
        params.insert("function", "GLOBAL_QUOTE");
        params.insert("symbol", symbol);
        params.insert("apikey", self.api_key.as_str());

        self.query(&params).await
    }

    async fn daily_series(&self, symbol: &str) -> Result<serde_json::Value> {
        let mut params = HashMap::new();
        params.insert("function", "TIME_SERIES_DAILY");
        params.insert("symbol", symbol);
        params.insert("outputsize", "full");
        params.insert("apikey", self.api_key.as_str());

        self.query(&params).await
    }

    async fn overview(&self, symbol: &str) -> Result<serde_json::Value> {
        let mut params = HashMap::new();
        params.insert("function", "OVERVIEW");
        params.insert("symbol", symbol);
        params.insert("apikey", self.api_key.as_str());

        self.query(&params).await
    }

    async fn sector_performance(&self) -> Result<serde_json::Value> {
        let mut params = HashMap::new();
        params.insert("function", "SECTOR");
        params.insert("apikey", self.api_key.as_str());

        self.query(&params).await
    }
}
