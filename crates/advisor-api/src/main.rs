//! Investment Strategy Advisor HTTP API
//!
//! Three endpoints over the advisor engine:
//!
//! - `POST /api/generate-strategy` — run the full pipeline on a goal
//! - `POST /api/process-feedback` — analyze feedback on a stored strategy
//! - `GET  /api/health` — liveness probe
//!
//! Recommendations live in an in-memory map for the lifetime of the
//! process; feedback is matched to them by id.

use advisor_engine::pipeline::SpecialistVotes;
use advisor_engine::{
    Advisor, AdvisorConfig, FeedbackAnalysis, FinanceClient, Goal, Strategy, SystemClock,
    knowledge,
};
use advisor_llm::providers::{OpenAiConfig, OpenAiProvider};
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AdvisorConfig::builder()
        .with_env_api_key()
        .from_env_model()
        .build()?;
    let corpus = knowledge::load_or_bootstrap(&config.knowledge_path)?;

    let api_base = std::env::var("OPENAI_API_BASE")
        .unwrap_or_else(|_| "https://api.openai.com/v1".to_string());
    let api_key = std::env::var("OPENAI_API_KEY").unwrap_or_else(|_| "not-needed".to_string());
    let provider = Arc::new(OpenAiProvider::with_config(
        OpenAiConfig::new(api_key).with_api_base(api_base),
    )?);

    let finance = Arc::new(FinanceClient::from_config(&config, Arc::new(SystemClock)));
    let advisor = Arc::new(Advisor::new(provider, finance, config, corpus));

    let state = AppState {
        advisor,
        recommendations: Arc::new(RwLock::new(HashMap::new())),
    };

    let app = Router::new()
        .route("/api/generate-strategy", post(generate_strategy))
        .route("/api/process-feedback", post(process_feedback))
        .route("/api/health", get(health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(8000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "advisor api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

#[derive(Clone)]
struct AppState {
    advisor: Arc<Advisor>,
    recommendations: Arc<RwLock<HashMap<Uuid, StoredRecommendation>>>,
}

/// A completed run kept around so feedback can refer back to it
struct StoredRecommendation {
    goal: Goal,
    strategy: Strategy,
    feedback: Option<FeedbackAnalysis>,
}

#[derive(Debug, Deserialize)]
struct InvestmentGoalRequest {
    goal_text: String,
    /// 1 = low, 2 = medium, 3 = high
    #[serde(default = "default_risk_tolerance")]
    risk_tolerance: i64,
    /// Years
    #[serde(default = "default_investment_horizon")]
    investment_horizon: i64,
    /// Dollars
    #[serde(default = "default_portfolio_size")]
    portfolio_size: i64,
}

fn default_risk_tolerance() -> i64 {
    2
}

fn default_investment_horizon() -> i64 {
    10
}

fn default_portfolio_size() -> i64 {
    10_000
}

#[derive(Debug, Serialize)]
struct StrategyResponse {
    recommendation_id: Uuid,
    structured_goal: Goal,
    strategy: Strategy,
    agent_insights: AgentInsights,
    presentation: String,
}

#[derive(Debug, Deserialize)]
struct FeedbackRequest {
    recommendation_id: Uuid,
    feedback_text: String,
}

#[derive(Debug, Serialize)]
struct FeedbackResponse {
    recommendation_id: Uuid,
    feedback_analysis: FeedbackAnalysis,
}

/// Headline numbers for the frontend, derived from the specialist ballots
#[derive(Debug, Serialize)]
struct AgentInsights {
    risk_agent_score: u8,
    goal_agent_confidence: f64,
    investment_agent_prediction: String,
}

impl AgentInsights {
    fn from_votes(votes: &SpecialistVotes) -> Self {
        let risk = votes.risk.mean_score().unwrap_or(5.0).round() as u8;
        let confidence = (votes.goal.mean_score().unwrap_or(7.0) * 10.0).round() / 100.0;
        let returns = votes.investment.mean_score().unwrap_or(6.0);
        Self {
            risk_agent_score: risk,
            goal_agent_confidence: confidence,
            investment_agent_prediction: format!("{returns:.0}% annual return"),
        }
    }
}

/// Numeric risk tolerance (1/2/3) → label
fn risk_tolerance_text(value: i64) -> &'static str {
    match value {
        1 => "low",
        2 => "medium",
        _ => "high",
    }
}

/// Investment horizon in years → label
fn horizon_text(years: i64) -> &'static str {
    if years < 10 {
        "short-term"
    } else if years <= 20 {
        "medium-term"
    } else {
        "long-term"
    }
}

async fn generate_strategy(
    State(state): State<AppState>,
    Json(request): Json<InvestmentGoalRequest>,
) -> Result<Json<StrategyResponse>, (StatusCode, String)> {
    let risk = risk_tolerance_text(request.risk_tolerance);
    let horizon = horizon_text(request.investment_horizon);

    let enhanced_input = format!(
        "{}\n\nMy risk tolerance is {risk}. My investment horizon is {} years. \
         My portfolio size is ${}.",
        request.goal_text, request.investment_horizon, request.portfolio_size
    );

    let run = state
        .advisor
        .run_with_profile(&enhanced_input, Some(risk), Some(horizon))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "strategy generation failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?;

    let recommendation_id = Uuid::new_v4();
    state.recommendations.write().await.insert(
        recommendation_id,
        StoredRecommendation {
            goal: run.goal.clone(),
            strategy: run.strategy.clone(),
            feedback: None,
        },
    );

    Ok(Json(StrategyResponse {
        recommendation_id,
        agent_insights: AgentInsights::from_votes(&run.votes),
        structured_goal: run.goal,
        strategy: run.strategy,
        presentation: run.presentation,
    }))
}

async fn process_feedback(
    State(state): State<AppState>,
    Json(request): Json<FeedbackRequest>,
) -> Result<Json<FeedbackResponse>, (StatusCode, String)> {
    let (goal, strategy) = {
        let recommendations = state.recommendations.read().await;
        let stored = recommendations
            .get(&request.recommendation_id)
            .ok_or_else(|| {
                (
                    StatusCode::NOT_FOUND,
                    "Recommendation not found".to_string(),
                )
            })?;
        (stored.goal.clone(), stored.strategy.clone())
    };

    let analysis = state
        .advisor
        .process_feedback(&goal, &strategy, &request.feedback_text)
        .await;

    if let Some(stored) = state
        .recommendations
        .write()
        .await
        .get_mut(&request.recommendation_id)
    {
        if stored.feedback.is_some() {
            tracing::debug!(id = %request.recommendation_id, "replacing earlier feedback analysis");
        }
        stored.feedback = Some(analysis.clone());
    }

    Ok(Json(FeedbackResponse {
        recommendation_id: request.recommendation_id,
        feedback_analysis: analysis,
    }))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use advisor_engine::pipeline::{ProductVote, VoteSet};

    #[test]
    fn test_risk_tolerance_mapping() {
        assert_eq!(risk_tolerance_text(1), "low");
        assert_eq!(risk_tolerance_text(2), "medium");
        assert_eq!(risk_tolerance_text(3), "high");
        // Anything out of range reads as high, as the form never sends it
        assert_eq!(risk_tolerance_text(7), "high");
    }

    #[test]
    fn test_horizon_mapping() {
        assert_eq!(horizon_text(5), "short-term");
        assert_eq!(horizon_text(9), "short-term");
        assert_eq!(horizon_text(10), "medium-term");
        assert_eq!(horizon_text(20), "medium-term");
        assert_eq!(horizon_text(21), "long-term");
    }

    #[test]
    fn test_agent_insights_from_votes() {
        let ballot = |score: f64| VoteSet {
            product_votes: vec![ProductVote {
                product_name: "VTI".to_string(),
                score,
                rationale: String::new(),
            }],
            overall_assessment: String::new(),
        };
        let votes = SpecialistVotes {
            investment: ballot(8.0),
            risk: ballot(6.0),
            goal: ballot(9.0),
        };

        let insights = AgentInsights::from_votes(&votes);
        assert_eq!(insights.risk_agent_score, 6);
        assert_eq!(insights.goal_agent_confidence, 0.9);
        assert_eq!(insights.investment_agent_prediction, "8% annual return");
    }

    #[test]
    fn test_request_defaults() {
        let request: InvestmentGoalRequest =
            serde_json::from_str(r#"{"goal_text": "retire comfortably"}"#).unwrap();
        assert_eq!(request.risk_tolerance, 2);
        assert_eq!(request.investment_horizon, 10);
        assert_eq!(request.portfolio_size, 10_000);
    }
}
