//! Configuration for the advisor

use crate::error::{AdvisorError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
const DEFAULT_KNOWLEDGE_PATH: &str = "data/investment_knowledge.txt";

/// Configuration for advisor operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvisorConfig {
    /// Model identifier passed to the LLM provider
    pub model: String,

    /// Max tokens per model completion
    pub max_tokens: usize,

    /// Cache TTL for quotes
    pub cache_ttl_quote: Duration,

    /// Cache TTL for performance metrics
    pub cache_ttl_metrics: Duration,

    /// Cache TTL for fund overviews
    pub cache_ttl_overview: Duration,

    /// Cache TTL for sector performance
    pub cache_ttl_sector: Duration,

    /// Request timeout for market data calls
    pub request_timeout: Duration,

    /// Market data API key (optional; operations error without it)
    pub market_api_key: Option<String>,

    /// Market data requests per minute (free tier: 5)
    pub market_rate_limit: u32,

    /// Path to the investment knowledge corpus
    pub knowledge_path: PathBuf,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 2048,
            cache_ttl_quote: Duration::from_secs(3600),       // 1 hour
            cache_ttl_metrics: Duration::from_secs(6 * 3600), // 6 hours
            cache_ttl_overview: Duration::from_secs(24 * 3600), // 24 hours
            cache_ttl_sector: Duration::from_secs(6 * 3600),  // 6 hours
            request_timeout: Duration::from_secs(30),
            market_api_key: None,
            market_rate_limit: 5,
            knowledge_path: PathBuf::from(DEFAULT_KNOWLEDGE_PATH),
        }
    }
}

impl AdvisorConfig {
    /// Create a new configuration builder
    pub fn builder() -> AdvisorConfigBuilder {
        AdvisorConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.model.is_empty() {
            return Err(AdvisorError::ConfigError(
                "model must not be empty".to_string(),
            ));
        }

        if self.max_tokens == 0 {
            return Err(AdvisorError::ConfigError(
                "max_tokens must be greater than 0".to_string(),
            ));
        }

        if self.market_rate_limit == 0 {
            return Err(AdvisorError::ConfigError(
                "market_rate_limit must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for AdvisorConfig
#[derive(Debug, Default)]
pub struct AdvisorConfigBuilder {
    model: Option<String>,
    max_tokens: Option<usize>,
    cache_ttl_quote: Option<Duration>,
    cache_ttl_metrics: Option<Duration>,
    cache_ttl_overview: Option<Duration>,
    cache_ttl_sector: Option<Duration>,
    request_timeout: Option<Duration>,
    market_api_key: Option<String>,
    market_rate_limit: Option<u32>,
    knowledge_path: Option<PathBuf>,
}

impl AdvisorConfigBuilder {
    /// Set the model identifier
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set max tokens per completion
    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set cache TTL for quotes
    pub fn cache_ttl_quote(mut self, duration: Duration) -> Self {
        self.cache_ttl_quote = Some(duration);
        self
    }

    /// Set cache TTL for performance metrics
    pub fn cache_ttl_metrics(mut self, duration: Duration) -> Self {
        self.cache_ttl_metrics = Some(duration);
        self
    }

    /// Set cache TTL for fund overviews
    pub fn cache_ttl_overview(mut self, duration: Duration) -> Self {
        self.cache_ttl_overview = Some(duration);
        self
    }

    /// Set cache TTL for sector performance
    pub fn cache_ttl_sector(mut self, duration: Duration) -> Self {
        self.cache_ttl_sector = Some(duration);
        self
    }

    /// Set the market data request timeout
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    /// Set the market data API key
    pub fn market_api_key(mut self, key: impl Into<String>) -> Self {
        self.market_api_key = Some(key.into());
        self
    }

    /// Set the market data rate limit (requests per minute)
    pub fn market_rate_limit(mut self, limit: u32) -> Self {
        self.market_rate_limit = Some(limit);
        self
    }

    /// Set the knowledge corpus path
    pub fn knowledge_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.knowledge_path = Some(path.into());
        self
    }

    /// Load the market data API key from the environment
    ///
    /// Checks `ALPHA_VANTAGE_API_KEY` first, then the legacy `STOCK_API_KEY`.
    pub fn with_env_api_key(mut self) -> Self {
        if let Ok(key) = std::env::var("ALPHA_VANTAGE_API_KEY") {
            self.market_api_key = Some(key);
        } else if let Ok(key) = std::env::var("STOCK_API_KEY") {
            self.market_api_key = Some(key);
        }
        self
    }

    /// Load the model identifier from the `OPENAI_MODEL` environment variable
    pub fn from_env_model(mut self) -> Self {
        if let Ok(model) = std::env::var("OPENAI_MODEL") {
            self.model = Some(model);
        }
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<AdvisorConfig> {
        let defaults = AdvisorConfig::default();

        let config = AdvisorConfig {
            model: self.model.unwrap_or(defaults.model),
            max_tokens: self.max_tokens.unwrap_or(defaults.max_tokens),
            cache_ttl_quote: self.cache_ttl_quote.unwrap_or(defaults.cache_ttl_quote),
            cache_ttl_metrics: self.cache_ttl_metrics.unwrap_or(defaults.cache_ttl_metrics),
            cache_ttl_overview: self
                .cache_ttl_overview
                .unwrap_or(defaults.cache_ttl_overview),
            cache_ttl_sector: self.cache_ttl_sector.unwrap_or(defaults.cache_ttl_sector),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            market_api_key: self.market_api_key,
            market_rate_limit: self.market_rate_limit.unwrap_or(defaults.market_rate_limit),
            knowledge_path: self.knowledge_path.unwrap_or(defaults.knowledge_path),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AdvisorConfig::default();
        assert_eq!(config.cache_ttl_quote, Duration::from_secs(3600));
        assert_eq!(config.cache_ttl_metrics, Duration::from_secs(21_600));
        assert_eq!(config.cache_ttl_overview, Duration::from_secs(86_400));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = AdvisorConfig::builder()
            .model("gpt-4-turbo")
            .market_api_key("demo")
            .market_rate_limit(75)
            .build()
            .unwrap();

        assert_eq!(config.model, "gpt-4-turbo");
        assert_eq!(config.market_api_key.as_deref(), Some("demo"));
        assert_eq!(config.market_rate_limit, 75);
    }

    #[test]
    fn test_validation_rejects_zero_rate_limit() {
        let result = AdvisorConfig::builder().market_rate_limit(0).build();
        assert!(result.is_err());
    }
}
