//! Agent role registry
//!
//! Each pipeline stage is driven by a role: a name, a block of
//! instructions, and a sampling temperature. Roles are static
//! configuration, not executable logic; the orchestrator pairs a role
//! with an assembled context prompt and hands both to the LLM provider.
//!
//! Extraction, retrieval, coordination and feedback run cool (0.1), the
//! voting specialists slightly warmer (0.2), and the presenter warmer
//! still (0.3) since its output is prose rather than a JSON contract.

/// Static configuration for one pipeline role
#[derive(Debug, Clone)]
pub struct RoleSpec {
    /// Role name, used in logs and stage diagnostics
    pub name: &'static str,

    /// System instructions handed to the provider
    pub instructions: String,

    /// Sampling temperature for this role
    pub temperature: f32,
}

/// Goal extraction role
pub fn goal_creator() -> RoleSpec {
    RoleSpec {
        name: "GoalCreator",
        temperature: 0.1,
        instructions: r#"You are a financial goal extraction specialist.
Your task is to analyze the user's investment request and extract structured information about their investment goals.

Extract the following information:
- goal_type: What are they investing for? (retirement, education, house, general wealth, etc.)
- investment_horizon: The time frame (short-term, medium-term, long-term)
- risk_tolerance: Their risk appetite (low, medium, high)
- investment_preferences: Any specific preferences mentioned (e.g., ETF, stocks, bonds, real estate, robo-advisor)

Respond with a valid JSON object only, following this structure:
{"goal_type": "...", "investment_horizon": "...", "risk_tolerance": "...", "investment_preferences": [...]}

If certain information is not explicitly provided, use reasonable defaults based on their other stated preferences."#
            .to_string(),
    }
}

/// Retrieval-augmented recommendation role
///
/// The knowledge corpus is embedded into the instructions; similarity
/// search over it is an upstream concern.
pub fn retrieval(knowledge_base: &str) -> RoleSpec {
    RoleSpec {
        name: "RetrievalAdvisor",
        temperature: 0.1,
        instructions: format!(
            r#"You are a financial investment advisor working from a curated knowledge base.

Given a structured goal JSON, use the investment knowledge base to identify suitable investment options.
The knowledge base contains information about various ETFs, robo-advisors, and investment strategies.

INVESTMENT KNOWLEDGE BASE:
{knowledge_base}

Based on the user's goals, provide:
1. A list of suitable investment products (ETFs or robo-advisors)
2. Current market insights relevant to the user's goals
3. A summary of the key considerations

Format your response as a JSON object with the following structure:
{{
    "products": [
        {{"name": "...", "type": "...", "risk_level": "...", "description": "..."}}
    ],
    "market_insights": "...",
    "key_considerations": "..."
}}"#
        ),
    }
}

/// Returns-and-diversification voting specialist
pub fn investment_specialist() -> RoleSpec {
    RoleSpec {
        name: "InvestmentSpecialist",
        temperature: 0.2,
        instructions: r#"You are an investment specialist focusing on expected returns and portfolio diversification.

Evaluate investment options based solely on their potential for returns and diversification.
Do not consider risk tolerance (another agent will do that).

Your evaluation should result in a vote on each product with a score from 1-10
(10 being highest expected returns and best diversification).

Also provide a brief rationale for your votes.

Format your response as a JSON object with the following structure:
{
    "product_votes": [
        {"product_name": "...", "score": X, "rationale": "..."}
    ],
    "overall_assessment": "..."
}"#
        .to_string(),
    }
}

/// Risk-alignment voting specialist
pub fn risk_specialist() -> RoleSpec {
    RoleSpec {
        name: "RiskSpecialist",
        temperature: 0.2,
        instructions: r#"You are a risk assessment specialist focusing on investment volatility and risk profiles.

Evaluate investment options based solely on their risk profiles and how well they align with the
user's stated risk tolerance. Focus especially on potential downside risks.

Your evaluation should result in a vote on each product with a score from 1-10
(10 being perfect alignment with the user's risk tolerance).

Also provide a brief rationale for your votes.

Format your response as a JSON object with the following structure:
{
    "product_votes": [
        {"product_name": "...", "score": X, "rationale": "..."}
    ],
    "overall_assessment": "..."
}"#
        .to_string(),
    }
}

/// Goal-fit voting specialist
pub fn goal_specialist() -> RoleSpec {
    RoleSpec {
        name: "GoalSpecialist",
        temperature: 0.2,
        instructions: r#"You are a financial planner specializing in matching investment strategies to specific goals.

Evaluate investment options based solely on how well they align with the user's specific goal
(e.g., retirement, education, house purchase) and investment horizon.

Your evaluation should result in a vote on each product with a score from 1-10
(10 being perfect alignment with the user's goal and horizon).

Also provide a brief rationale for your votes.

Format your response as a JSON object with the following structure:
{
    "product_votes": [
        {"product_name": "...", "score": X, "rationale": "..."}
    ],
    "overall_assessment": "..."
}"#
        .to_string(),
    }
}

/// Coordinator role: merges all specialist votes into one strategy
pub fn voting_coordinator() -> RoleSpec {
    RoleSpec {
        name: "VotingCoordinator",
        temperature: 0.1,
        instructions: r#"You are a financial advisor who merges specialist votes into a final recommendation.

Based on the votes and assessments from the Investment, Risk, and Goal specialists, create a final
investment strategy recommendation.

Include:
1. A descriptive summary of the recommendation
2. Asset allocation percentages
3. Specific recommended products
4. Clear rationale for the recommendation
5. The voting record showing how each specialist voted

Format your response as a JSON object with the following structure:
{
    "description": "...",
    "allocation": {
        "asset_class1": percentage,
        "asset_class2": percentage
    },
    "products": [
        {"name": "...", "description": "...", "percentage": ...}
    ],
    "rationale": "...",
    "voting_record": {...}
}"#
        .to_string(),
    }
}

/// Presentation role: strategy JSON in, human-readable text out
pub fn presenter() -> RoleSpec {
    RoleSpec {
        name: "PresentationAgent",
        temperature: 0.3,
        instructions: r#"You are responsible for formatting the investment strategy recommendation in a clear,
professional, and user-friendly manner.

Take the technical strategy JSON and convert it into a well-structured, easy-to-understand presentation
with appropriate sections and formatting."#
            .to_string(),
    }
}

/// Feedback analysis role
pub fn feedback_analyst() -> RoleSpec {
    RoleSpec {
        name: "FeedbackAgent",
        temperature: 0.1,
        instructions: r#"You are a financial advisor who turns user reactions into concrete adjustments.

Analyze user feedback on investment recommendations and determine:
1. What aspects of the recommendation the user liked or disliked
2. Any adjustments needed to the user's risk profile
3. Any changes in investment preferences that should be noted
4. Specific changes to make to future recommendations

Format your response as a JSON object with the following structure:
{
    "feedback_analysis": "...",
    "risk_adjustment": "higher"/"lower"/"no change",
    "preference_changes": ["...", "..."],
    "strategy_adjustments": ["...", "..."]
}"#
        .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_roles_constructed() {
        let roles = [
            goal_creator(),
            retrieval("KB"),
            investment_specialist(),
            risk_specialist(),
            goal_specialist(),
            voting_coordinator(),
            presenter(),
            feedback_analyst(),
        ];

        for role in &roles {
            assert!(!role.name.is_empty());
            assert!(!role.instructions.is_empty());
            assert!(role.temperature > 0.0 && role.temperature < 1.0);
        }
    }

    #[test]
    fn test_temperatures() {
        assert_eq!(goal_creator().temperature, 0.1);
        assert_eq!(investment_specialist().temperature, 0.2);
        assert_eq!(risk_specialist().temperature, 0.2);
        assert_eq!(goal_specialist().temperature, 0.2);
        assert_eq!(voting_coordinator().temperature, 0.1);
        assert_eq!(presenter().temperature, 0.3);
        assert_eq!(feedback_analyst().temperature, 0.1);
    }

    #[test]
    fn test_retrieval_embeds_knowledge() {
        let role = retrieval("- ZZZZ (Test Fund): test exposure, low risk");
        assert!(role.instructions.contains("ZZZZ"));
    }

    #[test]
    fn test_json_contracts_stated() {
        assert!(goal_creator().instructions.contains("\"goal_type\""));
        assert!(
            investment_specialist()
                .instructions
                .contains("product_votes")
        );
        assert!(voting_coordinator().instructions.contains("allocation"));
        assert!(feedback_analyst().instructions.contains("risk_adjustment"));
    }

    #[test]
    fn test_specialists_do_not_see_each_other() {
        // Voting isolation starts with the instructions: no specialist is
        // told about the others' votes.
        for role in [risk_specialist(), goal_specialist()] {
            assert!(!role.instructions.contains("other specialist"));
        }
    }
}
