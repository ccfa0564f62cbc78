//! Structured extraction from free-text model output
//!
//! Every pipeline stage asks the model for a JSON object but receives
//! free text. Extraction takes the span between the first `{` and the
//! last `}` and parses it. A reply containing several JSON-looking
//! fragments therefore yields one span bridging all of them, which may
//! not parse; callers must treat both failure modes as recoverable.

use serde::de::DeserializeOwned;
use thiserror::Error;

/// Why a model reply could not be turned into structured data
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    /// The reply contains no `{`...`}` span at all
    #[error("no JSON object found in model output")]
    NoJsonFound,

    /// A span was found but is not valid JSON (or not the expected shape)
    #[error("malformed JSON in model output: {0}")]
    MalformedJson(String),
}

/// Extract the JSON object embedded in `text`
///
/// Locates the first `{` and the last `}` and parses the substring.
pub fn extract_json(text: &str) -> Result<serde_json::Value, ExtractionError> {
    let start = text.find('{').ok_or(ExtractionError::NoJsonFound)?;
    let end = text.rfind('}').ok_or(ExtractionError::NoJsonFound)?;
    if end <= start {
        return Err(ExtractionError::NoJsonFound);
    }

    serde_json::from_str(&text[start..=end])
        .map_err(|e| ExtractionError::MalformedJson(e.to_string()))
}

/// Outcome of parsing one stage's model reply into its typed contract
///
/// The two arms make the orchestrator's branch-on-failure explicit and
/// exhaustive; `ExtractionFailed` carries the raw reply so the run can
/// surface it for diagnostics.
#[derive(Debug)]
pub enum StageOutcome<T> {
    /// The reply contained a JSON object matching the stage's schema
    Parsed(T),

    /// No usable JSON object could be recovered from the reply
    ExtractionFailed {
        reason: ExtractionError,
        raw: String,
    },
}

/// Parse a model reply into the typed output of a pipeline stage
pub fn parse_stage<T: DeserializeOwned>(text: &str) -> StageOutcome<T> {
    let value = match extract_json(text) {
        Ok(value) => value,
        Err(reason) => {
            return StageOutcome::ExtractionFailed {
                reason,
                raw: text.to_string(),
            };
        }
    };

    match serde_json::from_value(value) {
        Ok(parsed) => StageOutcome::Parsed(parsed),
        Err(e) => StageOutcome::ExtractionFailed {
            reason: ExtractionError::MalformedJson(e.to_string()),
            raw: text.to_string(),
        },
    }
}
