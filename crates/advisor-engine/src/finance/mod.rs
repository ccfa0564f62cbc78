//! Financial data: provider access, caching, and derived metrics
//!
//! The client wraps a market data source behind the time-windowed cache
//! and derives the analysis primitives the voting stages consume:
//! performance by horizon, volatility, risk scoring, portfolio
//! aggregates, and diversification recommendations.

pub mod alpha_vantage;
pub mod client;
pub mod lookup;
pub mod simulated;
pub mod types;

pub use alpha_vantage::{AlphaVantageClient, MarketDataSource};
pub use client::{FinanceClient, risk_matches};
pub use lookup::{AlternativesTable, SectorMap, StaticAlternatives, StaticSectorMap};
pub use types::{
    AlternativeInvestment, DiversificationReport, FinancialQuote, FundOverview, HorizonOutcome,
    InvestmentAnalysis, PerformanceMetrics, PortfolioEvaluation, PortfolioMetrics, Recommendation,
    RiskTolerance, SectorPerformance, SectorRanking, SuggestedAddition, SymbolEvaluation,
};
