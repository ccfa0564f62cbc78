//! Error types for advisor operations

use crate::extract::ExtractionError;
use thiserror::Error;

/// Advisor-specific errors
#[derive(Debug, Error)]
pub enum AdvisorError {
    /// No market data credential configured; every data operation
    /// short-circuits to this before any network call
    #[error("API key not set")]
    CredentialMissing,

    /// Market data provider could not be reached or replied with garbage
    #[error("Market data provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Provider responded but had no data for the requested symbol
    #[error("No data found for symbol {0}")]
    SymbolNotFound(String),

    /// A derived metric cannot be computed from the available data
    #[error("Insufficient performance data for {symbol}")]
    InsufficientData {
        symbol: String,
    },

    /// A pipeline stage reply failed structured extraction; the raw model
    /// text is preserved for diagnostics
    #[error("{stage} stage failed: {reason}")]
    StageFailed {
        stage: &'static str,
        reason: ExtractionError,
        raw: String,
    },

    /// LLM provider error
    #[error("LLM error: {0}")]
    Llm(#[from] advisor_llm::LlmError),

    /// Network or HTTP error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// I/O error (knowledge-base bootstrap)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for advisor operations
pub type Result<T> = std::result::Result<T, AdvisorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AdvisorError::CredentialMissing;
        assert_eq!(err.to_string(), "API key not set");

        let err = AdvisorError::SymbolNotFound("INVALID".to_string());
        assert_eq!(err.to_string(), "No data found for symbol INVALID");
    }

    #[test]
    fn test_stage_failure_keeps_raw_text() {
        let err = AdvisorError::StageFailed {
            stage: "goal_extraction",
            reason: ExtractionError::NoJsonFound,
            raw: "I'm sorry, I can't help with that.".to_string(),
        };
        assert!(err.to_string().contains("goal_extraction"));
        match err {
            AdvisorError::StageFailed { raw, .. } => {
                assert!(raw.contains("sorry"));
            }
            _ => panic!("expected StageFailed variant"),
        }
    }
}
