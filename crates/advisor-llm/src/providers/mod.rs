//! Concrete LLM provider implementations

mod anthropic;
mod openai;

pub use anthropic::AnthropicProvider;
pub use openai::{OpenAiConfig, OpenAiProvider};
