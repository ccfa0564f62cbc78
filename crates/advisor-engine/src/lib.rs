//! Investment strategy advisor engine
//!
//! This crate turns a free-text investment goal into a structured,
//! voted-on investment strategy through a fixed pipeline of
//! role-specialized model calls:
//!
//! - Goal extraction produces a structured [`pipeline::types::Goal`]
//! - Retrieval proposes candidate products from a knowledge corpus
//! - Three voting specialists (returns, risk, goal-fit) score the
//!   candidates independently and concurrently
//! - A coordinator merges the ballots into one [`pipeline::types::Strategy`]
//! - Enhancement annotates the strategy with live market data
//! - Presentation renders the strategy as human-readable text
//!
//! Model replies are free text; every stage recovers its typed output via
//! the structured-extraction utility in [`extract`]. Market data flows
//! through the [`finance::FinanceClient`], which caches provider reads
//! behind per-operation freshness windows and derives volatility, risk
//! scores, and portfolio aggregates.
//!
//! # Example
//!
//! ```rust,ignore
//! use advisor_engine::{Advisor, AdvisorConfig, FinanceClient, SystemClock, knowledge};
//! use advisor_llm::providers::OpenAiProvider;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = AdvisorConfig::builder().with_env_api_key().build()?;
//!     let corpus = knowledge::load_or_bootstrap(&config.knowledge_path)?;
//!
//!     let provider = Arc::new(OpenAiProvider::from_env()?);
//!     let finance = Arc::new(FinanceClient::from_config(&config, Arc::new(SystemClock)));
//!     let advisor = Advisor::new(provider, finance, config, corpus);
//!
//!     let run = advisor.run("I want to invest for retirement with low risk").await?;
//!     println!("{}", run.presentation);
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod extract;
pub mod finance;
pub mod knowledge;
pub mod pipeline;
pub mod roles;

// Re-export main types for convenience
pub use cache::{Clock, ManualClock, SystemClock, TimedStore};
pub use config::AdvisorConfig;
pub use error::{AdvisorError, Result};
pub use extract::{ExtractionError, StageOutcome, extract_json, parse_stage};
pub use finance::{FinanceClient, RiskTolerance};
pub use pipeline::{Advisor, AdvisorRun, FeedbackAnalysis, Goal, Strategy};
