//! Error types for the companion core

use solace_llm::LlmError;
use thiserror::Error;

/// Companion core error types
///
/// Only these two variants escape the core. Summarization failures are
/// caught and logged where they happen, and greeting generation degrades to
/// a locally computed greeting instead of failing the call.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Model unavailable: {0}")]
    ModelUnavailable(#[from] LlmError),
}

/// Result type alias for companion operations
pub type Result<T> = std::result::Result<T, CoreError>;
