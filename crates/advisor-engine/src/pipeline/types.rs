//! Typed stage contracts
//!
//! Each struct is the shape one pipeline stage promises to emit. The
//! model never guarantees schema validity, so optional fields default
//! rather than fail; the orchestrator treats a reply that misses the
//! required fields as an extraction failure.

use crate::finance::RiskTolerance;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Structured investment intent, produced once per run by goal extraction
/// and immutable thereafter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    pub goal_type: String,
    pub investment_horizon: String,
    pub risk_tolerance: String,
    #[serde(default)]
    pub investment_preferences: Vec<String>,
}

impl Goal {
    /// The goal's risk tolerance as a typed value (lenient: unknown
    /// labels read as medium)
    pub fn risk(&self) -> RiskTolerance {
        RiskTolerance::parse_lenient(&self.risk_tolerance)
    }
}

/// One candidate product from the retrieval stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestmentOption {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub risk_level: String,
    #[serde(default)]
    pub description: String,
}

/// Retrieval stage output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalOutput {
    pub products: Vec<InvestmentOption>,
    #[serde(default)]
    pub market_insights: String,
    #[serde(default)]
    pub key_considerations: String,
}

/// One specialist's score for one product
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductVote {
    pub product_name: String,
    /// 1-10; scores are independent per specialist, with no
    /// cross-specialist normalization
    pub score: f64,
    #[serde(default)]
    pub rationale: String,
}

/// One specialist's full ballot
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VoteSet {
    #[serde(default)]
    pub product_votes: Vec<ProductVote>,
    #[serde(default)]
    pub overall_assessment: String,
}

impl VoteSet {
    /// Mean product score, if any votes were cast
    pub fn mean_score(&self) -> Option<f64> {
        if self.product_votes.is_empty() {
            return None;
        }
        let sum: f64 = self.product_votes.iter().map(|v| v.score).sum();
        Some(sum / self.product_votes.len() as f64)
    }
}

/// A ballot attributed to the specialist that cast it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecialistVote {
    pub agent: String,
    pub votes: VoteSet,
}

/// All ballots for one run, recorded for accountability
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VotingRecord {
    pub votes: Vec<SpecialistVote>,
    pub timestamp: DateTime<Utc>,
}

/// A recommended product inside a strategy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyProduct {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub percentage: f64,
    /// Live price annotation added by the enhancement stage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_price: Option<String>,
    /// Live performance annotation added by the enhancement stage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance: Option<String>,
}

/// Coordination stage output: the final investment strategy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Strategy {
    pub description: String,
    /// Asset class → percentage
    #[serde(default)]
    pub allocation: BTreeMap<String, f64>,
    #[serde(default)]
    pub products: Vec<StrategyProduct>,
    #[serde(default)]
    pub rationale: String,
    /// Echo of the voting record, as the coordinator chose to report it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voting_record: Option<serde_json::Value>,
    /// Market commentary added by the enhancement stage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_analysis: Option<String>,
}

impl Strategy {
    /// Check that allocation percentages sum to ~100
    ///
    /// The coordinator promises percentages but nothing enforces them;
    /// an off total is logged, not rejected.
    pub fn check_allocation(&self) -> bool {
        let total: f64 = self.allocation.values().sum();
        let ok = (total - 100.0).abs() <= 0.5;
        if !ok {
            tracing::warn!(total, "strategy allocation does not sum to 100");
        }
        ok
    }
}

/// Direction to adjust the user's risk profile
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskAdjustment {
    Higher,
    Lower,
    #[default]
    #[serde(rename = "no change")]
    NoChange,
}

/// Feedback stage output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackAnalysis {
    #[serde(default)]
    pub feedback_analysis: String,
    #[serde(default)]
    pub risk_adjustment: RiskAdjustment,
    #[serde(default)]
    pub preference_changes: Vec<String>,
    #[serde(default)]
    pub strategy_adjustments: Vec<String>,
}

impl FeedbackAnalysis {
    /// The fixed fallback when feedback cannot be analyzed
    pub fn neutral() -> Self {
        Self {
            feedback_analysis: "Unable to analyze feedback properly.".to_string(),
            risk_adjustment: RiskAdjustment::NoChange,
            preference_changes: Vec::new(),
            strategy_adjustments: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_goal_risk_parse() {
        let goal = Goal {
            goal_type: "retirement".to_string(),
            investment_horizon: "long-term".to_string(),
            risk_tolerance: "low".to_string(),
            investment_preferences: vec!["ETF".to_string()],
        };
        assert_eq!(goal.risk(), RiskTolerance::Low);
    }

    #[test]
    fn test_retrieval_output_accepts_minimal_json() {
        let json = r#"{"products": [{"name": "VTI"}]}"#;
        let output: RetrievalOutput = serde_json::from_str(json).unwrap();
        assert_eq!(output.products.len(), 1);
        assert_eq!(output.products[0].name, "VTI");
        assert!(output.market_insights.is_empty());
    }

    #[test]
    fn test_option_type_field_roundtrip() {
        let json = r#"{"name": "BND", "type": "ETF", "risk_level": "low", "description": "bonds"}"#;
        let option: InvestmentOption = serde_json::from_str(json).unwrap();
        assert_eq!(option.kind, "ETF");
        let back = serde_json::to_value(&option).unwrap();
        assert_eq!(back["type"], "ETF");
    }

    #[test]
    fn test_vote_mean() {
        let votes = VoteSet {
            product_votes: vec![
                ProductVote {
                    product_name: "VTI".to_string(),
                    score: 8.0,
                    rationale: String::new(),
                },
                ProductVote {
                    product_name: "BND".to_string(),
                    score: 6.0,
                    rationale: String::new(),
                },
            ],
            overall_assessment: String::new(),
        };
        assert_eq!(votes.mean_score(), Some(7.0));
        assert_eq!(VoteSet::default().mean_score(), None);
    }

    #[test]
    fn test_allocation_check() {
        let mut strategy = Strategy {
            description: "balanced".to_string(),
            allocation: BTreeMap::from([
                ("stocks".to_string(), 60.0),
                ("bonds".to_string(), 40.0),
            ]),
            products: Vec::new(),
            rationale: String::new(),
            voting_record: None,
            market_analysis: None,
        };
        assert!(strategy.check_allocation());

        strategy.allocation.insert("cash".to_string(), 15.0);
        assert!(!strategy.check_allocation());
    }

    #[test]
    fn test_risk_adjustment_wire_format() {
        assert_eq!(
            serde_json::to_string(&RiskAdjustment::NoChange).unwrap(),
            "\"no change\""
        );
        let parsed: RiskAdjustment = serde_json::from_str("\"higher\"").unwrap();
        assert_eq!(parsed, RiskAdjustment::Higher);
    }

    #[test]
    fn test_neutral_feedback() {
        let neutral = FeedbackAnalysis::neutral();
        assert_eq!(neutral.risk_adjustment, RiskAdjustment::NoChange);
        assert!(neutral.preference_changes.is_empty());
        assert!(neutral.strategy_adjustments.is_empty());
    }
}
