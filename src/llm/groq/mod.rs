#[cfg(test)]
mod tests;

use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use crate::config::GenerationConfig;
use crate::http::{DEFAULT_RETRY_ATTEMPTS, DEFAULT_TIMEOUT_SECONDS, agent_with_timeout, send_with_retry};
use crate::llm::ChatMessage;

/// Client for Groq's OpenAI-compatible chat completion API
#[derive(Debug, Clone)]
pub struct GroqClient {
    base_url: Url,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    agent: ureq::Agent,
    retry_attempts: u32,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ModelsResponse {
    data: Vec<ModelInfo>,
}

#[derive(Debug, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    #[serde(default)]
    pub owned_by: Option<String>,
}

impl GroqClient {
    #[inline]
    pub fn new(config: &GenerationConfig, api_key: impl Into<String>) -> Result<Self> {
        let base_url = config
            .endpoint_url()
            .context("Failed to parse generation endpoint from config")?;

        Ok(Self {
            base_url,
            api_key: api_key.into(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            agent: agent_with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECONDS)),
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
        })
    }

    #[inline]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.agent = agent_with_timeout(timeout);
        self
    }

    #[inline]
    pub fn with_retry_attempts(mut self, attempts: u32) -> Self {
        self.retry_attempts = attempts;
        self
    }

    /// Verify the service is reachable and the configured model exists
    #[inline]
    pub fn health_check(&self) -> Result<()> {
        debug!("Validating model: {}", self.model);

        let models = self.list_models().context("Failed to list models")?;

        if models.iter().any(|m| m.id == self.model) {
            info!(
                "Health check passed for generation service at {} with model {}",
                self.base_url, self.model
            );
            Ok(())
        } else {
            let available: Vec<&str> = models.iter().map(|m| m.id.as_str()).collect();
            Err(anyhow::anyhow!(
                "Model '{}' is not available. Available models: {:?}",
                self.model,
                available
            ))
        }
    }

    /// List models available to this API key
    #[inline]
    pub fn list_models(&self) -> Result<Vec<ModelInfo>> {
        let url = self
            .base_url
            .join("/openai/v1/models")
            .context("Failed to build models URL")?;

        debug!("Fetching available models from {}", url);

        let response_text = send_with_retry(self.retry_attempts, || {
            self.agent
                .get(url.as_str())
                .header("Authorization", &format!("Bearer {}", self.api_key))
                .call()
                .and_then(|mut resp| resp.body_mut().read_to_string())
        })
        .context("Failed to fetch models")?;

        let models_response: ModelsResponse =
            serde_json::from_str(&response_text).context("Failed to parse models response")?;

        debug!("Found {} models", models_response.data.len());
        Ok(models_response.data)
    }

    /// Run a single chat completion and return the generated text verbatim
    #[inline]
    pub fn chat(&self, messages: &[ChatMessage]) -> Result<String> {
        debug!("Requesting chat completion with {} messages", messages.len());

        let request = ChatCompletionRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let url = self
            .base_url
            .join("/openai/v1/chat/completions")
            .context("Failed to build chat completion URL")?;

        let request_json =
            serde_json::to_string(&request).context("Failed to serialize chat request")?;

        let response_text = send_with_retry(self.retry_attempts, || {
            self.agent
                .post(url.as_str())
                .header("Authorization", &format!("Bearer {}", self.api_key))
                .header("Content-Type", "application/json")
                .send(&request_json)
                .and_then(|mut resp| resp.body_mut().read_to_string())
        })
        .context("Failed to complete chat request")?;

        let response: ChatCompletionResponse =
            serde_json::from_str(&response_text).context("Failed to parse chat response")?;

        let answer = response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| anyhow::anyhow!("Chat response contained no choices"))?;

        debug!("Received chat completion ({} chars)", answer.len());
        Ok(answer)
    }
}
