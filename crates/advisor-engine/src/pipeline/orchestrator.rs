//! Pipeline orchestrator
//!
//! Sequences the role invocations, threads each stage's structured
//! output into the next stage's prompt, and applies structured
//! extraction to every reply. A stage whose reply cannot be extracted
//! aborts the run with the raw text preserved; the feedback side-branch
//! is the designed exception (see [`super::feedback`]).

use crate::cache::{Clock, SystemClock};
use crate::config::AdvisorConfig;
use crate::error::{AdvisorError, Result};
use crate::extract::{StageOutcome, parse_stage};
use crate::finance::FinanceClient;
use crate::pipeline::enhance;
use crate::pipeline::types::{
    Goal, RetrievalOutput, SpecialistVote, Strategy, VoteSet, VotingRecord,
};
use crate::roles::{self, RoleSpec};
use advisor_llm::{CompletionRequest, LlmProvider, Message};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Stage names used in diagnostics
pub mod stage {
    pub const GOAL_EXTRACTION: &str = "goal_extraction";
    pub const RETRIEVAL: &str = "retrieval";
    pub const INVESTMENT_VOTE: &str = "investment_vote";
    pub const RISK_VOTE: &str = "risk_vote";
    pub const GOAL_VOTE: &str = "goal_vote";
    pub const COORDINATION: &str = "coordination";
}

/// The three independent ballots, one per specialist
#[derive(Debug, Clone)]
pub struct SpecialistVotes {
    pub investment: VoteSet,
    pub risk: VoteSet,
    pub goal: VoteSet,
}

/// Everything a completed run produced
#[derive(Debug, Clone)]
pub struct AdvisorRun {
    pub goal: Goal,
    pub options: RetrievalOutput,
    pub votes: SpecialistVotes,
    pub voting_record: VotingRecord,
    pub strategy: Strategy,
    pub presentation: String,
}

/// The investment strategy advisor
pub struct Advisor {
    provider: Arc<dyn LlmProvider>,
    finance: Arc<FinanceClient>,
    clock: Arc<dyn Clock>,
    config: AdvisorConfig,
    knowledge_base: String,
}

impl Advisor {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        finance: Arc<FinanceClient>,
        config: AdvisorConfig,
        knowledge_base: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            finance,
            clock: Arc::new(SystemClock),
            config,
            knowledge_base: knowledge_base.into(),
        }
    }

    /// Substitute the clock (for deterministic voting-record timestamps)
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn finance(&self) -> &FinanceClient {
        &self.finance
    }

    /// Invoke one role with an assembled prompt and return the raw reply
    pub(crate) async fn invoke(&self, role: &RoleSpec, prompt: String) -> Result<String> {
        debug!(role = role.name, "invoking role");
        let request = CompletionRequest::builder(&self.config.model)
            .system(role.instructions.clone())
            .add_message(Message::user(prompt))
            .max_tokens(self.config.max_tokens)
            .temperature(role.temperature)
            .build();

        let response = self.provider.complete(request).await?;
        Ok(response.message.content)
    }

    /// Invoke a role and extract its typed stage output
    ///
    /// Extraction failure aborts the run; the raw reply travels with the
    /// error so the surface can show what the model actually said.
    async fn run_stage<T: DeserializeOwned>(
        &self,
        role: &RoleSpec,
        prompt: String,
        stage: &'static str,
    ) -> Result<T> {
        let reply = self.invoke(role, prompt).await?;
        match parse_stage(&reply) {
            StageOutcome::Parsed(value) => {
                debug!(stage, "stage output parsed");
                Ok(value)
            }
            StageOutcome::ExtractionFailed { reason, raw } => {
                warn!(stage, %reason, "stage reply failed extraction");
                Err(AdvisorError::StageFailed { stage, reason, raw })
            }
        }
    }

    /// Run the full pipeline on a free-text investment goal
    pub async fn run(&self, goal_text: &str) -> Result<AdvisorRun> {
        self.run_with_profile(goal_text, None, None).await
    }

    /// Run the pipeline, overriding the extracted risk tolerance and/or
    /// horizon with values the caller already knows (the HTTP surface
    /// collects them as form fields)
    pub async fn run_with_profile(
        &self,
        goal_text: &str,
        risk_tolerance: Option<&str>,
        investment_horizon: Option<&str>,
    ) -> Result<AdvisorRun> {
        info!("extracting investment goals");
        let mut goal: Goal = self
            .run_stage(
                &roles::goal_creator(),
                format!("I need investment advice: {goal_text}"),
                stage::GOAL_EXTRACTION,
            )
            .await?;

        if let Some(risk) = risk_tolerance {
            goal.risk_tolerance = risk.to_string();
        }
        if let Some(horizon) = investment_horizon {
            goal.investment_horizon = horizon.to_string();
        }
        let goal_json = serde_json::to_string(&goal)?;

        info!("retrieving investment options");
        let retrieval_role = roles::retrieval(&self.knowledge_base);
        let options: RetrievalOutput = self
            .run_stage(
                &retrieval_role,
                format!(
                    "Based on this structured goal, what investment options would you recommend? {goal_json}"
                ),
                stage::RETRIEVAL,
            )
            .await?;
        let options_json = serde_json::to_string(&options)?;

        info!(products = options.products.len(), "collecting specialist votes");
        // The specialists share only the immutable (goal, options) context
        // and never see each other's ballots, so they run concurrently.
        // One failed ballot aborts the run: coordination has no
        // partial-vote path.
        let vote_prompt = |focus: &str| {
            format!(
                "Please evaluate these investment options based on {focus}:\nGoal: {goal_json}\nOptions: {options_json}"
            )
        };

        let investment_role = roles::investment_specialist();
        let risk_role = roles::risk_specialist();
        let goal_role = roles::goal_specialist();
        let (investment, risk, goal_fit) = tokio::try_join!(
            self.run_stage::<VoteSet>(
                &investment_role,
                vote_prompt("returns and diversification"),
                stage::INVESTMENT_VOTE,
            ),
            self.run_stage::<VoteSet>(
                &risk_role,
                vote_prompt("risk alignment"),
                stage::RISK_VOTE,
            ),
            self.run_stage::<VoteSet>(
                &goal_role,
                vote_prompt("goal alignment"),
                stage::GOAL_VOTE,
            ),
        )?;

        let votes = SpecialistVotes {
            investment,
            risk,
            goal: goal_fit,
        };
        let voting_record = VotingRecord {
            votes: vec![
                SpecialistVote {
                    agent: "InvestmentSpecialist".to_string(),
                    votes: votes.investment.clone(),
                },
                SpecialistVote {
                    agent: "RiskSpecialist".to_string(),
                    votes: votes.risk.clone(),
                },
                SpecialistVote {
                    agent: "GoalSpecialist".to_string(),
                    votes: votes.goal.clone(),
                },
            ],
            timestamp: self.clock.now(),
        };

        info!("coordinating votes into final strategy");
        let record_json = serde_json::to_string(&voting_record)?;
        let mut strategy: Strategy = self
            .run_stage(
                &roles::voting_coordinator(),
                format!(
                    "Please create a final investment strategy based on the following votes:\n\n\
                     Goal: {goal_json}\nOptions: {options_json}\n\nVoting Record: {record_json}"
                ),
                stage::COORDINATION,
            )
            .await?;
        strategy.check_allocation();

        info!("annotating strategy with market data");
        enhance::annotate_strategy(&self.finance, &mut strategy, goal.risk()).await;

        info!("formatting presentation");
        let strategy_json = serde_json::to_string(&strategy)?;
        let presentation = self
            .invoke(
                &roles::presenter(),
                format!(
                    "Please format this investment strategy for presentation to the user: {strategy_json}"
                ),
            )
            .await?;

        Ok(AdvisorRun {
            goal,
            options,
            votes,
            voting_record,
            strategy,
            presentation,
        })
    }
}
