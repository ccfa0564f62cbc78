//! Market data and analysis types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// User risk appetite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTolerance {
    Low,
    Medium,
    High,
}

impl RiskTolerance {
    /// Parse a free-text label, falling back to medium
    ///
    /// Goal extraction emits "low"/"medium"/"high" but is not guaranteed
    /// to; anything unrecognized is treated as medium.
    pub fn parse_lenient(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "low" => Self::Low,
            "high" => Self::High,
            _ => Self::Medium,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for RiskTolerance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Latest price snapshot for a symbol; cached with a 1-hour window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialQuote {
    pub symbol: String,
    pub price: f64,
    /// Raw provider string, e.g. "1.2345%"
    pub change_percent: String,
    pub volume: u64,
    pub last_updated: DateTime<Utc>,
}

/// Result for one lookback horizon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HorizonOutcome {
    /// The series had a usable reference date near the horizon target
    Change {
        price_change_percent: f64,
        reference_date: NaiveDate,
    },
    /// No date within the acceptance window of the target
    Unavailable {
        error: String,
    },
}

impl HorizonOutcome {
    /// The percentage change, if this horizon succeeded
    pub fn change_percent(&self) -> Option<f64> {
        match self {
            Self::Change {
                price_change_percent,
                ..
            } => Some(*price_change_percent),
            Self::Unavailable { .. } => None,
        }
    }
}

/// Performance by horizon for a symbol; cached with a 6-hour window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub symbol: String,
    pub current_price: f64,
    /// Keyed by horizon label: "1mo", "3mo", "6mo", "1yr"
    pub performance: BTreeMap<String, HorizonOutcome>,
}

/// Fund/company overview; cached with a 24-hour window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundOverview {
    pub symbol: String,
    pub name: String,
    pub description: String,
    pub sector: String,
    pub pe_ratio: String,
    pub dividend_yield: String,
    pub market_cap: String,
    pub last_updated: DateTime<Utc>,
}

/// Sector performance table; cached with a 6-hour window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectorPerformance {
    /// Sector name → provider percentage string, e.g. "+1.45%"
    pub sectors: BTreeMap<String, String>,
    pub last_updated: DateTime<Utc>,
}

/// Buy/hold/avoid call derived from performance and risk fit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recommendation {
    Buy,
    Hold,
    Avoid,
}

/// Suitability analysis for one symbol against a risk tolerance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestmentAnalysis {
    pub symbol: String,
    pub current_price: f64,
    pub performance: BTreeMap<String, HorizonOutcome>,
    /// 1-10, derived from volatility
    pub risk_score: u8,
    /// Max performance swing across the horizons that succeeded
    pub volatility: f64,
    pub risk_match: bool,
    pub recommendation: Recommendation,
}

/// Per-symbol entry in a portfolio evaluation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SymbolEvaluation {
    Analysis(InvestmentAnalysis),
    Failed {
        error: String,
    },
}

impl SymbolEvaluation {
    pub fn analysis(&self) -> Option<&InvestmentAnalysis> {
        match self {
            Self::Analysis(analysis) => Some(analysis),
            Self::Failed { .. } => None,
        }
    }
}

/// Aggregate metrics over the symbols that analyzed cleanly
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioMetrics {
    pub total_symbols: usize,
    pub valid_symbols: usize,
    pub avg_volatility: f64,
    pub risk_match_percentage: f64,
    /// min(10, valid symbol count)
    pub diversification_score: u8,
}

/// Evaluation of a whole symbol list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioEvaluation {
    pub symbol_evaluations: BTreeMap<String, SymbolEvaluation>,
    pub portfolio_metrics: PortfolioMetrics,
}

/// An alternative candidate with its analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlternativeInvestment {
    pub symbol: String,
    pub analysis: InvestmentAnalysis,
}

/// A concrete product to add for a missing sector
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestedAddition {
    pub sector: String,
    pub symbol: String,
    pub rationale: String,
}

/// One row of the top-performing-sector ranking
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectorRanking {
    pub sector: String,
    pub performance: String,
}

/// Recommendations for improving portfolio diversification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiversificationReport {
    pub missing_sectors: Vec<String>,
    pub sector_allocation: BTreeMap<String, usize>,
    pub suggested_additions: Vec<SuggestedAddition>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub top_performing_sectors: Vec<SectorRanking>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_tolerance_lenient_parse() {
        assert_eq!(RiskTolerance::parse_lenient("Low"), RiskTolerance::Low);
        assert_eq!(RiskTolerance::parse_lenient(" high "), RiskTolerance::High);
        assert_eq!(
            RiskTolerance::parse_lenient("aggressive"),
            RiskTolerance::Medium
        );
    }

    #[test]
    fn test_horizon_outcome_serialization() {
        let ok = HorizonOutcome::Change {
            price_change_percent: 18.2,
            reference_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
        };
        let json = serde_json::to_value(&ok).unwrap();
        assert_eq!(json["price_change_percent"], 18.2);

        let err = HorizonOutcome::Unavailable {
            error: "No data available within 7 days of target date".to_string(),
        };
        let json = serde_json::to_value(&err).unwrap();
        assert!(json.get("error").is_some());
    }

    #[test]
    fn test_recommendation_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Recommendation::Buy).unwrap(),
            "\"buy\""
        );
    }
}
