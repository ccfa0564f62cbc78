//! The advisor pipeline
//!
//! A fixed sequence of role invocations: goal extraction → retrieval →
//! three independent voting specialists → coordination → enhancement →
//! presentation, plus the feedback side-branch. Every stage output is a
//! typed contract recovered from free model text by structured
//! extraction.

pub mod enhance;
mod feedback;
pub mod orchestrator;
pub mod types;

pub use orchestrator::{Advisor, AdvisorRun, SpecialistVotes};
pub use types::{
    FeedbackAnalysis, Goal, InvestmentOption, ProductVote, RetrievalOutput, RiskAdjustment,
    SpecialistVote, Strategy, StrategyProduct, VoteSet, VotingRecord,
};
