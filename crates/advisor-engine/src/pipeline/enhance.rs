//! Enhancement stage: merge live market data into a strategy
//!
//! Deterministic annotation, no model call: for each product whose name
//! carries a symbol, attach the current price and one-year performance,
//! then summarize how the product set sits against the user's risk
//! profile. Without a market data credential the fixed simulated
//! annotations are used instead.

use crate::finance::types::HorizonOutcome;
use crate::finance::{FinanceClient, RiskTolerance, simulated};
use crate::pipeline::types::Strategy;
use tracing::debug;

/// Pull a ticker symbol out of a product name like
/// "VTI (Vanguard Total Stock Market)"
pub fn extract_symbol(name: &str) -> Option<String> {
    if !name.contains('(') {
        return None;
    }
    let candidate = name.split('(').next()?.trim();
    if candidate.is_empty() || candidate.len() > 5 {
        return None;
    }
    Some(candidate.to_string())
}

/// Annotate `strategy` in place with price/performance data
pub async fn annotate_strategy(
    finance: &FinanceClient,
    strategy: &mut Strategy,
    tolerance: RiskTolerance,
) {
    if !finance.has_credential() {
        debug!("no market data credential; using simulated annotations");
        for product in &mut strategy.products {
            if let Some(symbol) = extract_symbol(&product.name) {
                product.current_price = simulated::price_annotation(&symbol).map(String::from);
                product.performance = simulated::performance_annotation(&symbol).map(String::from);
            }
        }
        strategy.market_analysis = Some(simulated::market_analysis().to_string());
        return;
    }

    let mut symbols = Vec::new();
    for product in &mut strategy.products {
        let Some(symbol) = extract_symbol(&product.name) else {
            continue;
        };

        match finance.quote(&symbol).await {
            Ok(quote) => product.current_price = Some(format!("${:.2}", quote.price)),
            Err(e) => debug!(symbol, error = %e, "quote unavailable for annotation"),
        }

        match finance.performance(&symbol).await {
            Ok(metrics) => {
                if let Some(change) = metrics
                    .performance
                    .get("1yr")
                    .and_then(HorizonOutcome::change_percent)
                {
                    product.performance = Some(format!("{change:+.1}% (1yr)"));
                }
            }
            Err(e) => debug!(symbol, error = %e, "performance unavailable for annotation"),
        }

        symbols.push(symbol);
    }

    if !symbols.is_empty() {
        let eval = finance.evaluate_portfolio(&symbols, tolerance).await;
        let metrics = &eval.portfolio_metrics;
        strategy.market_analysis = Some(format!(
            "{} of {} recommended products have current market data; average volatility {:.2}; \
             {}% align with the {} risk profile; diversification score {}/10.",
            metrics.valid_symbols,
            metrics.total_symbols,
            metrics.avg_volatility,
            metrics.risk_match_percentage,
            tolerance,
            metrics.diversification_score,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{ManualClock, SystemClock};
    use crate::config::AdvisorConfig;
    use crate::pipeline::types::StrategyProduct;
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeMap;
    use std::sync::Arc;

    fn strategy_with(names: &[&str]) -> Strategy {
        Strategy {
            description: "test".to_string(),
            allocation: BTreeMap::new(),
            products: names
                .iter()
                .map(|name| StrategyProduct {
                    name: (*name).to_string(),
                    description: String::new(),
                    percentage: 0.0,
                    current_price: None,
                    performance: None,
                })
                .collect(),
            rationale: String::new(),
            voting_record: None,
            market_analysis: None,
        }
    }

    #[test]
    fn test_extract_symbol() {
        assert_eq!(
            extract_symbol("VTI (Vanguard Total Stock Market)"),
            Some("VTI".to_string())
        );
        assert_eq!(extract_symbol("Betterment"), None);
        assert_eq!(
            extract_symbol("LONGNAME (Some Fund)"),
            None,
            "symbols longer than 5 characters are not symbols"
        );
        assert_eq!(extract_symbol("(parenthetical only)"), None);
    }

    #[tokio::test]
    async fn test_simulated_annotations_without_credential() {
        let config = AdvisorConfig::default();
        let finance = FinanceClient::new(None, Arc::new(SystemClock), &config);

        let mut strategy = strategy_with(&["VTI (Vanguard Total Stock Market)", "Betterment"]);
        annotate_strategy(&finance, &mut strategy, RiskTolerance::Medium).await;

        assert_eq!(
            strategy.products[0].current_price.as_deref(),
            Some("$257.83")
        );
        assert_eq!(
            strategy.products[0].performance.as_deref(),
            Some("+18.2% (1yr)")
        );
        assert!(strategy.products[1].current_price.is_none());
        assert!(strategy.market_analysis.is_some());
    }

    #[tokio::test]
    async fn test_unknown_symbols_left_unannotated() {
        let config = AdvisorConfig::default();
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
        ));
        let finance = FinanceClient::new(None, clock, &config);

        let mut strategy = strategy_with(&["ZZZZ (Unknown Fund)"]);
        annotate_strategy(&finance, &mut strategy, RiskTolerance::Low).await;
        assert!(strategy.products[0].current_price.is_none());
    }
}
