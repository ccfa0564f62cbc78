//! Caching financial data client and derived metrics
//!
//! Wraps a [`MarketDataSource`] behind the time-windowed cache and
//! derives everything the pipeline consumes. Failures never cross this
//! boundary as panics: every operation returns a tagged error value and
//! the caller decides whether to abort or substitute simulated data.

use crate::cache::{Clock, TimedStore};
use crate::config::AdvisorConfig;
use crate::error::{AdvisorError, Result};
use crate::finance::alpha_vantage::{AlphaVantageClient, MarketDataSource};
use crate::finance::lookup::{AlternativesTable, SectorMap, StaticAlternatives, StaticSectorMap};
use crate::finance::types::{
    AlternativeInvestment, DiversificationReport, FinancialQuote, FundOverview, HorizonOutcome,
    InvestmentAnalysis, PerformanceMetrics, PortfolioEvaluation, PortfolioMetrics, Recommendation,
    RiskTolerance, SectorPerformance, SectorRanking, SuggestedAddition, SymbolEvaluation,
};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Lookback horizons: label → days
const HORIZONS: [(&str, i64); 4] = [("1mo", 30), ("3mo", 90), ("6mo", 180), ("1yr", 365)];

/// A horizon's reference date must be within this many days of its target
const HORIZON_WINDOW_DAYS: i64 = 7;

/// Whether a derived risk score fits a stated tolerance
///
/// Boundary arithmetic is preserved exactly as shipped: `low` accepts
/// scores ≤ 4, `medium` accepts > 3 and ≤ 7, `high` accepts > 6. A score
/// of 4 therefore satisfies both the low and the medium condition; do not
/// "fix" this without revisiting every caller.
pub fn risk_matches(tolerance: RiskTolerance, risk_score: u8) -> bool {
    match tolerance {
        RiskTolerance::Low => risk_score <= 4,
        RiskTolerance::Medium => risk_score > 3 && risk_score <= 7,
        RiskTolerance::High => risk_score > 6,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Provider numbers arrive as strings; absent or unparseable fields read as zero
fn field_f64(value: &serde_json::Value) -> f64 {
    value.as_str().unwrap_or("0").parse().unwrap_or(0.0)
}

fn field_u64(value: &serde_json::Value) -> u64 {
    value.as_str().unwrap_or("0").parse().unwrap_or(0)
}

/// Caching financial data client
pub struct FinanceClient {
    /// None when no credential is configured; every operation then
    /// short-circuits to `CredentialMissing` without a network call
    source: Option<Arc<dyn MarketDataSource>>,
    store: TimedStore,
    clock: Arc<dyn Clock>,
    ttl_quote: Duration,
    ttl_metrics: Duration,
    ttl_overview: Duration,
    ttl_sector: Duration,
    alternatives: Arc<dyn AlternativesTable>,
    sectors: Arc<dyn SectorMap>,
}

impl FinanceClient {
    /// Create a client with an explicit (possibly absent) data source
    pub fn new(
        source: Option<Arc<dyn MarketDataSource>>,
        clock: Arc<dyn Clock>,
        config: &AdvisorConfig,
    ) -> Self {
        Self {
            source,
            store: TimedStore::new(Arc::clone(&clock)),
            clock,
            ttl_quote: config.cache_ttl_quote,
            ttl_metrics: config.cache_ttl_metrics,
            ttl_overview: config.cache_ttl_overview,
            ttl_sector: config.cache_ttl_sector,
            alternatives: Arc::new(StaticAlternatives),
            sectors: Arc::new(StaticSectorMap),
        }
    }

    /// Create a client from configuration, wiring up Alpha Vantage when a
    /// credential is present
    pub fn from_config(config: &AdvisorConfig, clock: Arc<dyn Clock>) -> Self {
        let source = config.market_api_key.as_ref().map(|key| {
            Arc::new(AlphaVantageClient::new(
                key.clone(),
                config.market_rate_limit,
                config.request_timeout,
            )) as Arc<dyn MarketDataSource>
        });
        if source.is_none() {
            warn!("no market data API key configured; data operations will be unavailable");
        }
        Self::new(source, clock, config)
    }

    /// Substitute the lookup tables (alternatives tiers, sector map)
    pub fn with_tables(
        mut self,
        alternatives: Arc<dyn AlternativesTable>,
        sectors: Arc<dyn SectorMap>,
    ) -> Self {
        self.alternatives = alternatives;
        self.sectors = sectors;
        self
    }

    /// Whether a market data credential is configured
    pub fn has_credential(&self) -> bool {
        self.source.is_some()
    }

    fn source(&self) -> Result<&Arc<dyn MarketDataSource>> {
        self.source.as_ref().ok_or(AdvisorError::CredentialMissing)
    }

    /// Latest quote for `symbol`; cached for the quote TTL (1 hour)
    pub async fn quote(&self, symbol: &str) -> Result<FinancialQuote> {
        let source = self.source()?;

        let key = format!("price_{symbol}");
        if let Some(cached) = self.store.get_fresh(&key, self.ttl_quote).await {
            if let Ok(quote) = serde_json::from_value(cached) {
                return Ok(quote);
            }
        }

        let data = source.global_quote(symbol).await?;
        if !data
            .get("Global Quote")
            .and_then(|v| v.as_object())
            .is_some_and(|o| !o.is_empty())
        {
            return Err(AdvisorError::SymbolNotFound(symbol.to_string()));
        }

        let block = &data["Global Quote"];
        let quote = FinancialQuote {
            symbol: symbol.to_string(),
            price: field_f64(&block["05. price"]),
            change_percent: block["10. change percent"]
                .as_str()
                .unwrap_or_default()
                .to_string(),
            volume: field_u64(&block["06. volume"]),
            last_updated: self.clock.now(),
        };

        self.store.insert(key, serde_json::to_value(&quote)?).await;
        Ok(quote)
    }

    /// Performance over the four horizons; cached for the metrics TTL (6 hours)
    ///
    /// A horizon whose nearest series date falls outside the 7-day window
    /// records a per-horizon error instead of failing the whole call.
    pub async fn performance(&self, symbol: &str) -> Result<PerformanceMetrics> {
        let source = self.source()?;

        let key = format!("metrics_{symbol}");
        if let Some(cached) = self.store.get_fresh(&key, self.ttl_metrics).await {
            if let Ok(metrics) = serde_json::from_value(cached) {
                return Ok(metrics);
            }
        }

        let data = source.daily_series(symbol).await?;
        let series = data
            .get("Time Series (Daily)")
            .and_then(|v| v.as_object())
            .filter(|o| !o.is_empty())
            .ok_or_else(|| AdvisorError::SymbolNotFound(symbol.to_string()))?;

        // Most recent first; string sort is date sort for YYYY-MM-DD keys
        let mut closes: Vec<(NaiveDate, f64)> = series
            .iter()
            .filter_map(|(date, values)| {
                let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
                Some((date, field_f64(&values["4. close"])))
            })
            .collect();
        closes.sort_by(|a, b| b.0.cmp(&a.0));

        let (_, current_price) = *closes
            .first()
            .ok_or_else(|| AdvisorError::SymbolNotFound(symbol.to_string()))?;

        let today = self.clock.now().date_naive();
        let mut performance = BTreeMap::new();

        for (label, days) in HORIZONS {
            let target = today - chrono::Duration::days(days);

            // First minimal distance wins (iteration order: newest first)
            let nearest = closes
                .iter()
                .min_by_key(|(date, _)| (*date - target).num_days().abs());

            let outcome = match nearest {
                Some((date, past_price))
                    if (*date - target).num_days().abs() <= HORIZON_WINDOW_DAYS =>
                {
                    let percent_change = ((current_price - past_price) / past_price) * 100.0;
                    HorizonOutcome::Change {
                        price_change_percent: round2(percent_change),
                        reference_date: *date,
                    }
                }
                _ => HorizonOutcome::Unavailable {
                    error: "No data available within 7 days of target date".to_string(),
                },
            };
            performance.insert(label.to_string(), outcome);
        }

        let metrics = PerformanceMetrics {
            symbol: symbol.to_string(),
            current_price,
            performance,
        };

        self.store
            .insert(key, serde_json::to_value(&metrics)?)
            .await;
        Ok(metrics)
    }

    /// Fund overview; cached for the overview TTL (24 hours)
    pub async fn overview(&self, symbol: &str) -> Result<FundOverview> {
        let source = self.source()?;

        let key = format!("overview_{symbol}");
        if let Some(cached) = self.store.get_fresh(&key, self.ttl_overview).await {
            if let Ok(overview) = serde_json::from_value(cached) {
                return Ok(overview);
            }
        }

        let data = source.overview(symbol).await?;
        let obj = data
            .as_object()
            .filter(|o| !o.is_empty())
            .ok_or_else(|| AdvisorError::SymbolNotFound(symbol.to_string()))?;

        let text = |field: &str, default: &str| {
            obj.get(field)
                .and_then(|v| v.as_str())
                .unwrap_or(default)
                .to_string()
        };

        let overview = FundOverview {
            symbol: symbol.to_string(),
            name: text("Name", "Unknown"),
            description: text("Description", "No description available"),
            sector: text("Sector", "Various"),
            pe_ratio: text("PERatio", "N/A"),
            dividend_yield: text("DividendYield", "N/A"),
            market_cap: text("MarketCapitalization", "N/A"),
            last_updated: self.clock.now(),
        };

        self.store
            .insert(key, serde_json::to_value(&overview)?)
            .await;
        Ok(overview)
    }

    /// Sector performance table; cached for the sector TTL (6 hours)
    pub async fn sector_performance(&self) -> Result<SectorPerformance> {
        let source = self.source()?;

        let key = "sector_performance";
        if let Some(cached) = self.store.get_fresh(key, self.ttl_sector).await {
            if let Ok(sectors) = serde_json::from_value(cached) {
                return Ok(sectors);
            }
        }

        let data = source.sector_performance().await?;
        let table = data
            .get("Rank A: Real-Time Performance")
            .and_then(|v| v.as_object())
            .ok_or_else(|| {
                AdvisorError::ProviderUnavailable(
                    "No sector performance data available".to_string(),
                )
            })?;

        let sectors = SectorPerformance {
            sectors: table
                .iter()
                .filter_map(|(sector, perf)| {
                    Some((sector.clone(), perf.as_str()?.to_string()))
                })
                .collect(),
            last_updated: self.clock.now(),
        };

        self.store
            .insert(key, serde_json::to_value(&sectors)?)
            .await;
        Ok(sectors)
    }

    /// Analyze a symbol's suitability for a risk tolerance
    pub async fn analyze(
        &self,
        symbol: &str,
        tolerance: RiskTolerance,
    ) -> Result<InvestmentAnalysis> {
        let metrics = self.performance(symbol).await?;
        let quote = self.quote(symbol).await?;
        derive_analysis(symbol, &metrics, quote.price, tolerance)
    }

    /// Evaluate a symbol list for inclusion in a portfolio
    ///
    /// Per-symbol failures become entries, not errors; aggregates cover
    /// only the symbols that analyzed cleanly.
    pub async fn evaluate_portfolio(
        &self,
        symbols: &[String],
        tolerance: RiskTolerance,
    ) -> PortfolioEvaluation {
        let mut evaluations = BTreeMap::new();
        let mut total_volatility = 0.0;
        let mut valid = 0usize;
        let mut matched = 0usize;

        for symbol in symbols {
            match self.analyze(symbol, tolerance).await {
                Ok(analysis) => {
                    valid += 1;
                    total_volatility += analysis.volatility;
                    if analysis.risk_match {
                        matched += 1;
                    }
                    evaluations.insert(symbol.clone(), SymbolEvaluation::Analysis(analysis));
                }
                Err(e) => {
                    evaluations.insert(
                        symbol.clone(),
                        SymbolEvaluation::Failed {
                            error: e.to_string(),
                        },
                    );
                }
            }
        }

        let portfolio_metrics = PortfolioMetrics {
            total_symbols: symbols.len(),
            valid_symbols: valid,
            avg_volatility: if valid > 0 {
                round2(total_volatility / valid as f64)
            } else {
                0.0
            },
            risk_match_percentage: if valid > 0 {
                round2(matched as f64 / valid as f64 * 100.0)
            } else {
                0.0
            },
            diversification_score: valid.min(10) as u8,
        };

        PortfolioEvaluation {
            symbol_evaluations: evaluations,
            portfolio_metrics,
        }
    }

    /// Find alternatives to `symbol` in the matching risk tier
    ///
    /// Analyzes at most `count` candidates from the tier (reference
    /// symbol excluded) and skips any that error.
    pub async fn find_alternatives(
        &self,
        symbol: &str,
        tolerance: RiskTolerance,
        count: usize,
    ) -> Vec<AlternativeInvestment> {
        let candidates: Vec<String> = self
            .alternatives
            .candidates(tolerance)
            .into_iter()
            .filter(|candidate| candidate != symbol)
            .collect();

        let mut results = Vec::new();
        for candidate in candidates.into_iter().take(count) {
            match self.analyze(&candidate, tolerance).await {
                Ok(analysis) => results.push(AlternativeInvestment {
                    symbol: candidate,
                    analysis,
                }),
                Err(e) => {
                    tracing::debug!(symbol = %candidate, error = %e, "skipping alternative");
                }
            }
            if results.len() >= count {
                break;
            }
        }
        results
    }

    /// Recommend additions that improve portfolio diversification
    pub async fn recommend_diversification(
        &self,
        symbols: &[String],
        tolerance: RiskTolerance,
    ) -> DiversificationReport {
        let sector_data = self.sector_performance().await.ok();

        let mut sector_allocation: BTreeMap<String, usize> = BTreeMap::new();
        for symbol in symbols {
            let sector = self.sectors.sector_of(symbol).unwrap_or("Unknown");
            *sector_allocation.entry(sector.to_string()).or_insert(0) += 1;
        }

        let missing_sectors: Vec<String> = self
            .sectors
            .key_sectors()
            .into_iter()
            .filter(|sector| !sector_allocation.contains_key(*sector))
            .map(String::from)
            .collect();

        let mut suggested_additions = Vec::new();
        for sector in &missing_sectors {
            let (symbol, rationale) = match sector.as_str() {
                "US Stocks" => (
                    if tolerance == RiskTolerance::Low {
                        "VIG"
                    } else {
                        "VTI"
                    },
                    "Provides broad US market exposure",
                ),
                "International Stocks" => ("VXUS", "Adds international diversification"),
                "US Bonds" => ("BND", "Adds stability and income"),
                "Real Estate" => ("VNQ", "Provides exposure to real estate sector"),
                _ => continue,
            };
            suggested_additions.push(SuggestedAddition {
                sector: sector.clone(),
                symbol: symbol.to_string(),
                rationale: rationale.to_string(),
            });
        }

        // Provider strings look like "+1.45%"; unparseable entries are skipped
        let mut top_performing_sectors = Vec::new();
        if let Some(data) = sector_data {
            let mut ranked: Vec<(String, f64)> = data
                .sectors
                .iter()
                .filter_map(|(sector, performance)| {
                    let value: f64 = performance
                        .trim_end_matches('%')
                        .trim_start_matches('+')
                        .parse()
                        .ok()?;
                    Some((sector.clone(), value))
                })
                .collect();
            ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
            top_performing_sectors = ranked
                .into_iter()
                .take(3)
                .map(|(sector, perf)| SectorRanking {
                    sector,
                    performance: format!("{perf}%"),
                })
                .collect();
        }

        DiversificationReport {
            missing_sectors,
            sector_allocation,
            suggested_additions,
            top_performing_sectors,
        }
    }
}

/// Derive an analysis from already-fetched metrics and price
///
/// Volatility is the spread between the best and worst horizon among
/// those that succeeded; with zero usable horizons the analysis cannot
/// be computed at all.
fn derive_analysis(
    symbol: &str,
    metrics: &PerformanceMetrics,
    current_price: f64,
    tolerance: RiskTolerance,
) -> Result<InvestmentAnalysis> {
    let performances: Vec<f64> = metrics
        .performance
        .values()
        .filter_map(HorizonOutcome::change_percent)
        .collect();

    if performances.is_empty() {
        return Err(AdvisorError::InsufficientData {
            symbol: symbol.to_string(),
        });
    }

    let max = performances.iter().fold(f64::NEG_INFINITY, |a, b| a.max(*b));
    let min = performances.iter().fold(f64::INFINITY, |a, b| a.min(*b));
    let volatility = max - min;

    let risk_score = ((volatility / 5.0).round() as i64).clamp(1, 10) as u8;
    let risk_match = risk_matches(tolerance, risk_score);

    let yearly = metrics
        .performance
        .get("1yr")
        .and_then(HorizonOutcome::change_percent);

    let recommendation = match yearly {
        Some(change) if change > 15.0 && risk_match => Recommendation::Buy,
        Some(change) if change < -10.0 => Recommendation::Avoid,
        _ => Recommendation::Hold,
    };

    Ok(InvestmentAnalysis {
        symbol: symbol.to_string(),
        current_price,
        performance: metrics.performance.clone(),
        risk_score,
        volatility: round2(volatility),
        risk_match,
        recommendation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scripted source: serves canned payloads, counts calls, errors on
    /// unknown symbols
    struct FakeSource {
        series: BTreeMap<String, serde_json::Value>,
        quotes: BTreeMap<String, serde_json::Value>,
        sector_table: Option<serde_json::Value>,
        calls: AtomicUsize,
    }

    impl FakeSource {
        fn new() -> Self {
            Self {
                series: BTreeMap::new(),
                quotes: BTreeMap::new(),
                sector_table: None,
                calls: AtomicUsize::new(0),
            }
        }

        fn with_symbol(mut self, symbol: &str, closes: &[(&str, f64)], price: f64) -> Self {
            let mut entries = serde_json::Map::new();
            for (date, close) in closes {
                entries.insert(
                    (*date).to_string(),
                    json!({ "4. close": format!("{close}") }),
                );
            }
            self.series.insert(
                symbol.to_string(),
                json!({ "Time Series (Daily)": entries }),
            );
            self.quotes.insert(
                symbol.to_string(),
                json!({
                    "Global Quote": {
                        "05. price": format!("{price}"),
                        "10. change percent": "0.5000%",
                        "06. volume": "1000000"
                    }
                }),
            );
            self
        }

        fn with_sectors(mut self, table: serde_json::Value) -> Self {
            self.sector_table = Some(json!({ "Rank A: Real-Time Performance": table }));
            self
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl MarketDataSource for FakeSource {
        async fn global_quote(&self, symbol: &str) -> Result<serde_json::Value> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.quotes
                .get(symbol)
                .cloned()
                .ok_or_else(|| AdvisorError::SymbolNotFound(symbol.to_string()))
        }

        async fn daily_series(&self, symbol: &str) -> Result<serde_json::Value> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.series
                .get(symbol)
                .cloned()
                .ok_or_else(|| AdvisorError::SymbolNotFound(symbol.to_string()))
        }

        async fn overview(&self, symbol: &str) -> Result<serde_json::Value> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(json!({ "Symbol": symbol, "Name": "Test Fund" }))
        }

        async fn sector_performance(&self) -> Result<serde_json::Value> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.sector_table.clone().ok_or_else(|| {
                AdvisorError::ProviderUnavailable("no sector data scripted".to_string())
            })
        }
    }

    fn clock_at(y: i32, m: u32, d: u32) -> Arc<ManualClock> {
        Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap(),
        ))
    }

    fn client_with(source: FakeSource, clock: Arc<ManualClock>) -> (FinanceClient, Arc<FakeSource>) {
        let source = Arc::new(source);
        let config = AdvisorConfig::default();
        let client = FinanceClient::new(
            Some(Arc::clone(&source) as Arc<dyn MarketDataSource>),
            clock,
            &config,
        );
        (client, source)
    }

    /// A symbol with closes at all four horizon targets relative to 2024-06-01
    fn full_history(symbol: &str) -> FakeSource {
        FakeSource::new().with_symbol(
            symbol,
            &[
                ("2024-06-01", 118.0),
                ("2024-05-02", 116.0),
                ("2024-03-03", 112.0),
                ("2023-12-04", 109.0),
                ("2023-06-02", 100.0),
            ],
            118.0,
        )
    }

    #[tokio::test]
    async fn test_quote_cached_within_ttl() {
        let clock = clock_at(2024, 6, 1);
        let (client, source) = client_with(full_history("VTI"), Arc::clone(&clock));

        let first = client.quote("VTI").await.unwrap();
        let second = client.quote("VTI").await.unwrap();
        assert_eq!(first.price, second.price);
        assert_eq!(source.call_count(), 1);

        // Past the 1-hour window the provider is hit again
        clock.advance(Duration::from_secs(3601));
        client.quote("VTI").await.unwrap();
        assert_eq!(source.call_count(), 2);
    }

    #[tokio::test]
    async fn test_missing_credential_short_circuits() {
        let config = AdvisorConfig::default();
        let client = FinanceClient::new(None, clock_at(2024, 6, 1), &config);

        let err = client.quote("VTI").await.unwrap_err();
        assert!(matches!(err, AdvisorError::CredentialMissing));
        assert_eq!(err.to_string(), "API key not set");
    }

    #[tokio::test]
    async fn test_horizon_nearest_date_and_window() {
        // Clock pinned so the 1mo target is 2024-01-08: both series dates
        // are exactly 7 days away, and the tie goes to the first minimal
        // match in newest-first order (2024-01-15).
        let clock = clock_at(2024, 2, 7);
        let source = FakeSource::new().with_symbol(
            "SPAR",
            &[("2024-01-15", 110.0), ("2024-01-01", 100.0)],
            110.0,
        );
        let (client, _) = client_with(source, clock);

        let metrics = client.performance("SPAR").await.unwrap();
        assert_eq!(metrics.current_price, 110.0);

        match &metrics.performance["1mo"] {
            HorizonOutcome::Change { reference_date, .. } => {
                assert_eq!(
                    *reference_date,
                    NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
                );
            }
            HorizonOutcome::Unavailable { .. } => panic!("1mo horizon should resolve"),
        }

        // The 3mo/6mo/1yr targets are far outside the series
        for label in ["3mo", "6mo", "1yr"] {
            assert!(
                matches!(
                    metrics.performance[label],
                    HorizonOutcome::Unavailable { .. }
                ),
                "{label} should be unavailable"
            );
        }
    }

    #[tokio::test]
    async fn test_performance_cached_within_ttl() {
        let clock = clock_at(2024, 6, 1);
        let (client, source) = client_with(full_history("VTI"), clock);

        client.performance("VTI").await.unwrap();
        client.performance("VTI").await.unwrap();
        assert_eq!(source.call_count(), 1);
    }

    #[test]
    fn test_derive_analysis_worked_example() {
        // Horizons 2%, -1%, 3%, 18% → volatility spans the full set:
        // 18 - (-1) = 19, risk score round(19/5) = 4, which still matches
        // low tolerance (≤ 4), and the 18% year triggers a buy.
        let mut performance = BTreeMap::new();
        for (label, change) in [("1mo", 2.0), ("3mo", -1.0), ("6mo", 3.0), ("1yr", 18.0)] {
            performance.insert(
                label.to_string(),
                HorizonOutcome::Change {
                    price_change_percent: change,
                    reference_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                },
            );
        }
        let metrics = PerformanceMetrics {
            symbol: "VTI".to_string(),
            current_price: 118.0,
            performance,
        };

        let analysis = derive_analysis("VTI", &metrics, 118.0, RiskTolerance::Low).unwrap();
        assert_eq!(analysis.volatility, 19.0);
        assert_eq!(analysis.risk_score, 4);
        assert!(analysis.risk_match);
        assert_eq!(analysis.recommendation, Recommendation::Buy);
    }

    #[test]
    fn test_derive_analysis_avoid_on_bad_year() {
        let mut performance = BTreeMap::new();
        performance.insert(
            "1yr".to_string(),
            HorizonOutcome::Change {
                price_change_percent: -12.0,
                reference_date: NaiveDate::from_ymd_opt(2023, 6, 1).unwrap(),
            },
        );
        let metrics = PerformanceMetrics {
            symbol: "ARKK".to_string(),
            current_price: 44.0,
            performance,
        };

        let analysis = derive_analysis("ARKK", &metrics, 44.0, RiskTolerance::High).unwrap();
        assert_eq!(analysis.recommendation, Recommendation::Avoid);
    }

    #[test]
    fn test_derive_analysis_insufficient_data() {
        let mut performance = BTreeMap::new();
        for label in ["1mo", "3mo", "6mo", "1yr"] {
            performance.insert(
                label.to_string(),
                HorizonOutcome::Unavailable {
                    error: "No data available within 7 days of target date".to_string(),
                },
            );
        }
        let metrics = PerformanceMetrics {
            symbol: "NEWF".to_string(),
            current_price: 10.0,
            performance,
        };

        let err = derive_analysis("NEWF", &metrics, 10.0, RiskTolerance::Low).unwrap_err();
        assert!(matches!(err, AdvisorError::InsufficientData { .. }));
    }

    #[test]
    fn risk_score_four_matches_low_and_medium() {
        // Genuine overlap in the shipped boundaries, preserved on purpose:
        // 4 ≤ 4 and 4 > 3 ∧ 4 ≤ 7 are both true.
        assert!(risk_matches(RiskTolerance::Low, 4));
        assert!(risk_matches(RiskTolerance::Medium, 4));
        assert!(!risk_matches(RiskTolerance::High, 4));
    }

    #[test]
    fn test_risk_boundaries() {
        assert!(risk_matches(RiskTolerance::Low, 1));
        assert!(!risk_matches(RiskTolerance::Low, 5));
        assert!(risk_matches(RiskTolerance::Medium, 7));
        assert!(!risk_matches(RiskTolerance::Medium, 8));
        assert!(risk_matches(RiskTolerance::High, 7));
        assert!(!risk_matches(RiskTolerance::High, 6));
    }

    #[tokio::test]
    async fn test_evaluate_portfolio_with_one_failure() {
        let clock = clock_at(2024, 6, 1);
        let (client, _) = client_with(full_history("GOOD"), clock);

        let symbols = vec!["GOOD".to_string(), "MISSING".to_string()];
        let eval = client
            .evaluate_portfolio(&symbols, RiskTolerance::Medium)
            .await;

        assert_eq!(eval.portfolio_metrics.total_symbols, 2);
        assert_eq!(eval.portfolio_metrics.valid_symbols, 1);
        assert_eq!(eval.portfolio_metrics.diversification_score, 1);
        assert!(eval.symbol_evaluations["GOOD"].analysis().is_some());
        assert!(matches!(
            eval.symbol_evaluations["MISSING"],
            SymbolEvaluation::Failed { .. }
        ));

        // Average volatility covers the valid symbol only
        let good = eval.symbol_evaluations["GOOD"].analysis().unwrap();
        assert_eq!(eval.portfolio_metrics.avg_volatility, good.volatility);
    }

    #[tokio::test]
    async fn test_find_alternatives_excludes_reference() {
        let clock = clock_at(2024, 6, 1);
        // Medium tier is [VTI, VOO, VIG, IJH, VXUS]; only VOO has data
        let (client, _) = client_with(full_history("VOO"), clock);

        let alternatives = client
            .find_alternatives("VTI", RiskTolerance::Medium, 3)
            .await;

        assert_eq!(alternatives.len(), 1);
        assert_eq!(alternatives[0].symbol, "VOO");
    }

    #[tokio::test]
    async fn test_diversification_recommendations() {
        let clock = clock_at(2024, 6, 1);
        let source = full_history("VTI").with_sectors(json!({
            "Information Technology": "+2.92%",
            "Financials": "+1.45%",
            "Energy": "+0.75%",
            "Utilities": "-0.50%",
            "Mystery": "n/a"
        }));
        let (client, _) = client_with(source, clock);

        let report = client
            .recommend_diversification(&["VTI".to_string()], RiskTolerance::Medium)
            .await;

        assert_eq!(report.sector_allocation["US Stocks"], 1);
        assert_eq!(
            report.missing_sectors,
            vec!["International Stocks", "US Bonds", "Real Estate"]
        );
        assert_eq!(report.suggested_additions.len(), 3);
        assert!(
            report
                .suggested_additions
                .iter()
                .any(|a| a.symbol == "VXUS")
        );

        let top: Vec<&str> = report
            .top_performing_sectors
            .iter()
            .map(|r| r.sector.as_str())
            .collect();
        assert_eq!(top, vec!["Information Technology", "Financials", "Energy"]);
    }

    #[tokio::test]
    async fn test_low_tolerance_gets_dividend_tilt() {
        let clock = clock_at(2024, 6, 1);
        let (client, _) = client_with(FakeSource::new(), clock);

        let report = client
            .recommend_diversification(&["BND".to_string()], RiskTolerance::Low)
            .await;

        let us_stocks = report
            .suggested_additions
            .iter()
            .find(|a| a.sector == "US Stocks")
            .unwrap();
        assert_eq!(us_stocks.symbol, "VIG");
    }
}
