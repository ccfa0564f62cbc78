//! Feedback loop
//!
//! A single-stage extension of the pipeline. Unlike the main stages,
//! which abort on extraction failure, feedback analysis degrades to a
//! fixed neutral default: by the time feedback arrives the user already
//! has a strategy, and an unparseable reply here should not look like a
//! failed run.

use crate::extract::{StageOutcome, parse_stage};
use crate::pipeline::orchestrator::Advisor;
use crate::pipeline::types::{FeedbackAnalysis, Goal, Strategy};
use crate::roles;
use tracing::{info, warn};

impl Advisor {
    /// Analyze free-text user feedback against the goal and strategy it
    /// refers to
    pub async fn process_feedback(
        &self,
        goal: &Goal,
        strategy: &Strategy,
        feedback_text: &str,
    ) -> FeedbackAnalysis {
        info!("processing user feedback");

        let goal_json = serde_json::to_string(goal).unwrap_or_default();
        let strategy_json = serde_json::to_string(strategy).unwrap_or_default();
        let prompt = format!(
            "Process this feedback on an investment recommendation:\n\n\
             Original Goal: {goal_json}\n\
             Recommended Strategy: {strategy_json}\n\
             User Feedback: {feedback_text}"
        );

        let reply = match self.invoke(&roles::feedback_analyst(), prompt).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "feedback call failed; substituting neutral analysis");
                return FeedbackAnalysis::neutral();
            }
        };

        match parse_stage::<FeedbackAnalysis>(&reply) {
            StageOutcome::Parsed(analysis) => analysis,
            StageOutcome::ExtractionFailed { reason, .. } => {
                warn!(%reason, "feedback reply failed extraction; substituting neutral analysis");
                FeedbackAnalysis::neutral()
            }
        }
    }
}
