//! LLM provider abstraction for the investment advisor
//!
//! The advisor pipeline treats the language model as an opaque function:
//! role instructions and a prompt go in, free text comes out. This crate
//! defines that boundary — message and completion types, the
//! [`LlmProvider`] trait, and concrete providers for OpenAI-compatible
//! and Anthropic APIs.

mod completion;
mod error;
mod messages;
mod provider;
pub mod providers;

pub use completion::{
    CompletionRequest, CompletionRequestBuilder, CompletionResponse, StopReason, TokenUsage,
};
pub use error::{LlmError, Result};
pub use messages::{Message, Role};
pub use provider::LlmProvider;
