//! Solace LLM - model-client abstraction for the Solace companion
//!
//! This crate provides:
//! - A provider-agnostic `LlmClient` trait for chat completions
//! - A DeepSeek provider speaking the OpenAI-compatible wire format
//! - Bounded retry with exponential backoff and `retry-after` support
//! - A deterministic scripted mock client for tests

pub mod client;
pub mod deepseek;
pub mod error;
pub mod mock;
pub mod retry;

pub use client::{
    CompletionRequest, CompletionResponse, FinishReason, LlmClient, Message, Role, TokenUsage,
};
pub use deepseek::DeepSeekClient;
pub use error::{LlmError, Result};
pub use mock::{MockLlmClient, MockStep};
pub use retry::LlmRetryConfig;
