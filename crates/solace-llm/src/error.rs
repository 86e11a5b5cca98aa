//! Error types for model-client operations

use thiserror::Error;

/// Model-client error types
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{provider} API error (status {status}): {message}")]
    Api {
        provider: String,
        status: u16,
        message: String,
        retry_after_secs: Option<u64>,
    },

    #[error("Malformed provider response: {0}")]
    Provider(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LlmError {
    /// Whether the request that produced this error may succeed on retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            LlmError::Http(err) => err.is_timeout() || err.is_connect(),
            LlmError::Api { status, .. } => {
                matches!(*status, 408 | 429) || *status >= 500
            }
            LlmError::Provider(_) | LlmError::Json(_) => false,
        }
    }

    /// Provider-requested retry delay in seconds, if one was given.
    pub fn retry_after(&self) -> Option<u64> {
        match self {
            LlmError::Api {
                retry_after_secs, ..
            } => *retry_after_secs,
            _ => None,
        }
    }
}

/// Result type alias for model-client operations
pub type Result<T> = std::result::Result<T, LlmError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_retryable_by_status() {
        let rate_limited = LlmError::Api {
            provider: "DeepSeek".to_string(),
            status: 429,
            message: "rate limit".to_string(),
            retry_after_secs: None,
        };
        let unauthorized = LlmError::Api {
            provider: "DeepSeek".to_string(),
            status: 401,
            message: "unauthorized".to_string(),
            retry_after_secs: None,
        };
        let server_error = LlmError::Api {
            provider: "DeepSeek".to_string(),
            status: 503,
            message: "overloaded".to_string(),
            retry_after_secs: None,
        };

        assert!(rate_limited.is_retryable());
        assert!(server_error.is_retryable());
        assert!(!unauthorized.is_retryable());
    }

    #[test]
    fn malformed_response_is_not_retryable() {
        let err = LlmError::Provider("no choices".to_string());
        assert!(!err.is_retryable());
        assert_eq!(err.retry_after(), None);
    }
}
