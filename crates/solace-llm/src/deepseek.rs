//! DeepSeek LLM provider (OpenAI-compatible wire format)

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::client::{
    CompletionRequest, CompletionResponse, FinishReason, LlmClient, Role, TokenUsage,
};
use crate::error::{LlmError, Result};
use crate::retry::{LlmRetryConfig, response_to_error};

/// DeepSeek client
///
/// Talks to any endpoint that implements the OpenAI-style
/// `POST {base_url}/chat/completions` contract.
pub struct DeepSeekClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    retry_config: LlmRetryConfig,
}

impl DeepSeekClient {
    /// Create a new DeepSeek client
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: "deepseek-chat".to_string(),
            base_url: "https://api.deepseek.com/v1".to_string(),
            retry_config: LlmRetryConfig::default(),
        }
    }

    /// Set the model to use
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set custom base URL (for API-compatible services)
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_retry_config(mut self, config: LlmRetryConfig) -> Self {
        self.retry_config = config;
        self
    }
}

#[derive(Serialize)]
struct DeepSeekRequest {
    model: String,
    messages: Vec<DeepSeekMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    stream: bool,
}

#[derive(Serialize)]
struct DeepSeekMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct DeepSeekResponse {
    choices: Vec<DeepSeekChoice>,
    usage: Option<DeepSeekUsage>,
}

#[derive(Deserialize)]
struct DeepSeekChoice {
    message: DeepSeekResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct DeepSeekResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize, Debug)]
struct DeepSeekUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

fn to_wire_messages(request: &CompletionRequest) -> Vec<DeepSeekMessage> {
    request
        .messages
        .iter()
        .map(|m| {
            let role = match m.role {
                Role::System => "system",
                Role::User => "user",
                Role::Assistant => "assistant",
            }
            .to_string();

            DeepSeekMessage {
                role,
                content: m.content.clone(),
            }
        })
        .collect()
}

#[async_trait]
impl LlmClient for DeepSeekClient {
    fn provider(&self) -> &str {
        "deepseek"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let body = DeepSeekRequest {
            model: self.model.clone(),
            messages: to_wire_messages(&request),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            stream: false,
        };

        let mut last_error = None;

        for attempt in 0..=self.retry_config.max_retries {
            let response = match self
                .client
                .post(format!("{}/chat/completions", self.base_url))
                .header("Authorization", format!("Bearer {}", self.api_key))
                .header("Content-Type", "application/json")
                .json(&body)
                .send()
                .await
            {
                Ok(resp) => resp,
                Err(e) => {
                    let error = LlmError::Http(e);
                    if !error.is_retryable() || attempt == self.retry_config.max_retries {
                        return Err(error);
                    }
                    let delay = self.retry_config.delay_for(attempt + 1, None);
                    tracing::warn!(
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis(),
                        "Retrying DeepSeek request after connection error"
                    );
                    tokio::time::sleep(delay).await;
                    last_error = Some(error);
                    continue;
                }
            };

            if response.status().is_success() {
                let data: DeepSeekResponse = response.json().await?;
                let choice = data
                    .choices
                    .into_iter()
                    .next()
                    .ok_or_else(|| LlmError::Provider("no choices in response".to_string()))?;

                let finish_reason = match choice.finish_reason.as_deref() {
                    Some("stop") | None => FinishReason::Stop,
                    Some("length") => FinishReason::MaxTokens,
                    Some(_) => FinishReason::Error,
                };

                let usage = data.usage.map(|u| TokenUsage {
                    prompt_tokens: u.prompt_tokens,
                    completion_tokens: u.completion_tokens,
                    total_tokens: u.total_tokens,
                });

                return Ok(CompletionResponse {
                    content: choice.message.content,
                    finish_reason,
                    usage,
                });
            }

            let error = response_to_error(response, "DeepSeek").await;
            if !error.is_retryable() || attempt == self.retry_config.max_retries {
                return Err(error);
            }

            let delay = self
                .retry_config
                .delay_for(attempt + 1, error.retry_after());
            tracing::warn!(
                attempt = attempt + 1,
                delay_ms = delay.as_millis(),
                "Retrying DeepSeek request"
            );
            tokio::time::sleep(delay).await;
            last_error = Some(error);
        }

        Err(last_error
            .unwrap_or_else(|| LlmError::Provider("request failed after retries".to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::Message;

    #[test]
    fn builder_overrides_defaults() {
        let client = DeepSeekClient::new("key")
            .with_model("deepseek-v3")
            .with_base_url("http://localhost:9999/v1");

        assert_eq!(client.provider(), "deepseek");
        assert_eq!(client.model(), "deepseek-v3");
        assert_eq!(client.base_url, "http://localhost:9999/v1");
    }

    #[test]
    fn wire_messages_map_roles() {
        let request = CompletionRequest::new(vec![
            Message::system("s"),
            Message::user("u"),
            Message::assistant("a"),
        ]);

        let wire = to_wire_messages(&request);
        assert_eq!(wire[0].role, "system");
        assert_eq!(wire[1].role, "user");
        assert_eq!(wire[2].role, "assistant");
    }
}
