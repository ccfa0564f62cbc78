//! Investment Strategy Advisor CLI
//!
//! An interactive loop: describe an investment goal, get a strategy,
//! react to it, get a feedback analysis.
//!
//! # Usage
//!
//! ```bash
//! # Set up environment variables
//! export OPENAI_API_KEY="sk-..."
//! export OPENAI_MODEL="gpt-4-turbo"
//! export ALPHA_VANTAGE_API_KEY="..."   # optional; simulated data otherwise
//!
//! cargo run --bin advisor -p advisor-engine
//! ```

use advisor_engine::{Advisor, AdvisorConfig, FinanceClient, SystemClock, knowledge};
use advisor_llm::providers::{OpenAiConfig, OpenAiProvider};
use clap::Parser;
use std::env;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(name = "advisor", about = "Interactive investment strategy advisor")]
struct Args {
    /// Path to the investment knowledge corpus (bootstrapped if absent)
    #[arg(long)]
    knowledge: Option<PathBuf>,

    /// Model identifier (overrides OPENAI_MODEL)
    #[arg(long)]
    model: Option<String>,
}

fn print_banner() {
    println!(
        r"
╔══════════════════════════════════════════════════════════════╗
║               Investment Strategy Advisor                    ║
║                                                              ║
║  Describe your investment goal in plain language, e.g.:      ║
║    'I want to invest for retirement with low risk'           ║
║    'Saving for a house in 5 years, mostly ETFs'              ║
║                                                              ║
║  After each strategy you can give feedback on it.            ║
║  Type 'quit' to exit.                                        ║
╚══════════════════════════════════════════════════════════════╝
"
    );
}

fn provider_config() -> (OpenAiConfig, String) {
    let api_base = env::var("OPENAI_API_BASE")
        .unwrap_or_else(|_| "https://api.openai.com/v1".to_string());

    let model = env::var("OPENAI_MODEL").unwrap_or_else(|_| {
        eprintln!("Warning: OPENAI_MODEL not set, using default");
        "gpt-3.5-turbo".to_string()
    });

    let api_key = env::var("OPENAI_API_KEY").unwrap_or_else(|_| "not-needed".to_string());

    let config = OpenAiConfig::new(api_key)
        .with_api_base(api_base)
        .with_timeout(180);

    (config, model)
}

fn read_line(stdin: &io::Stdin, prompt: &str) -> io::Result<Option<String>> {
    print!("{prompt}");
    io::stdout().flush()?;

    let mut input = String::new();
    if stdin.lock().read_line(&mut input)? == 0 {
        return Ok(None); // EOF
    }
    Ok(Some(input.trim().to_string()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            env::var("RUST_LOG").unwrap_or_else(|_| "warn,advisor_engine=info".to_string()),
        )
        .init();

    print_banner();

    let args = Args::parse();
    let (openai_config, env_model) = provider_config();

    let mut builder = AdvisorConfig::builder()
        .with_env_api_key()
        .model(args.model.unwrap_or(env_model));
    if let Some(path) = args.knowledge {
        builder = builder.knowledge_path(path);
    }
    let config = builder.build()?;

    let corpus = knowledge::load_or_bootstrap(&config.knowledge_path)?;

    println!("Configuration:");
    println!("  Model: {}", config.model);
    println!(
        "  Market data: {}",
        if config.market_api_key.is_some() {
            "live (Alpha Vantage)"
        } else {
            "simulated (no API key)"
        }
    );
    println!();

    let provider = Arc::new(OpenAiProvider::with_config(openai_config)?);
    let finance = Arc::new(FinanceClient::from_config(&config, Arc::new(SystemClock)));
    let advisor = Advisor::new(provider, finance, config, corpus);

    let stdin = io::stdin();

    loop {
        let Some(goal_text) = read_line(&stdin, "\nYour investment goal: ")? else {
            println!("\nGoodbye!");
            break;
        };

        if goal_text.is_empty() {
            continue;
        }
        if matches!(goal_text.to_lowercase().as_str(), "quit" | "exit" | "q") {
            println!("Thank you for using the Investment Strategy Advisor!");
            break;
        }

        println!("\nProcessing your request...");
        let run = match advisor.run(&goal_text).await {
            Ok(run) => run,
            Err(e) => {
                eprintln!("Error processing your request: {e}");
                eprintln!("Please try again with a clearer investment goal.");
                continue;
            }
        };

        println!("\n{}", "=".repeat(80));
        println!("{}", run.presentation);
        println!("{}", "=".repeat(80));

        let Some(feedback) = read_line(&stdin, "\nWhat do you think of this recommendation? ")?
        else {
            println!("\nGoodbye!");
            break;
        };

        if feedback.is_empty() {
            continue;
        }

        let analysis = advisor
            .process_feedback(&run.goal, &run.strategy, &feedback)
            .await;

        println!("\nThank you for your feedback! Your preferences have been updated.");
        println!("\nFeedback analysis: {}", analysis.feedback_analysis);

        if analysis.risk_adjustment != advisor_engine::pipeline::RiskAdjustment::NoChange {
            println!("Risk adjustment: {:?}", analysis.risk_adjustment);
        }
        if !analysis.preference_changes.is_empty() {
            println!(
                "Preference changes: {}",
                analysis.preference_changes.join(", ")
            );
        }
        if !analysis.strategy_adjustments.is_empty() {
            println!(
                "Strategy adjustments for next time: {}",
                analysis.strategy_adjustments.join(", ")
            );
        }

        println!("\nWould you like to see another investment strategy? Please provide a new goal.");
    }

    Ok(())
}
