#[cfg(test)]
mod tests;

use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use url::Url;

use crate::config::EmbeddingConfig;
use crate::http::{DEFAULT_RETRY_ATTEMPTS, DEFAULT_TIMEOUT_SECONDS, agent_with_timeout, send_with_retry};

pub const DEFAULT_EMBEDDING_DIMENSION: u32 = 1024;

/// Client for the Cohere embedding API
#[derive(Debug, Clone)]
pub struct CohereClient {
    base_url: Url,
    api_key: String,
    model: String,
    batch_size: u32,
    agent: ureq::Agent,
    retry_attempts: u32,
}

/// Distinguishes stored-document embeddings from query embeddings; the
/// embedding model produces asymmetric vectors for the two cases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputType {
    SearchDocument,
    SearchQuery,
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    texts: &'a [String],
    input_type: InputType,
    truncate: &'static str,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

#[derive(Debug, Deserialize)]
struct ModelsResponse {
    models: Vec<ModelInfo>,
}

#[derive(Debug, Deserialize)]
pub struct ModelInfo {
    pub name: String,
    #[serde(default)]
    pub endpoints: Vec<String>,
}

impl CohereClient {
    #[inline]
    pub fn new(config: &EmbeddingConfig, api_key: impl Into<String>) -> Result<Self> {
        let base_url = config
            .endpoint_url()
            .context("Failed to parse embedding endpoint from config")?;

        Ok(Self {
            base_url,
            api_key: api_key.into(),
            model: config.model.clone(),
            batch_size: config.batch_size,
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

    /// Check that the embedding service is reachable and accepts our key
    #[inline]
    pub fn health_check(&self) -> Result<()> {
        debug!("Performing health check against {}", self.base_url);

        let models = self.list_models().context("Failed to list models")?;

        if !models.iter().any(|m| m.name == self.model) {
            warn!(
                "Embedding model {} not returned by the models endpoint",
                self.model
            );
        }

        info!(
            "Health check passed for embedding service at {} with model {}",
            self.base_url, self.model
        );
        Ok(())
    }

    /// List models available to this API key
    #[inline]
    pub fn list_models(&self) -> Result<Vec<ModelInfo>> {
        let url = self
            .base_url
            .join("/v1/models")
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

        debug!("Found {} models", models_response.models.len());
        Ok(models_response.models)
    }

    /// Generate an embedding for a single query string
    #[inline]
    pub fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        debug!("Generating query embedding (length: {})", text.len());

        let texts = [text.to_string()];
        let mut vectors = self.embed_single_batch(&texts, InputType::SearchQuery)?;

        vectors
            .pop()
            .ok_or_else(|| anyhow::anyhow!("Embedding service returned no vector for the query"))
    }

    /// Generate embeddings for document chunks, order-preserving
    #[inline]
    pub fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!("Generating embeddings for {} texts", texts.len());

        let mut results = Vec::with_capacity(texts.len());

        // The API caps texts per call, so large inputs go out in batches
        for batch in texts.chunks(self.batch_size as usize) {
            let vectors = self
                .embed_single_batch(batch, InputType::SearchDocument)
                .with_context(|| format!("Failed to embed batch of {} texts", batch.len()))?;
            results.extend(vectors);
        }

        debug!("Generated {} embeddings total", results.len());
        Ok(results)
    }

    fn embed_single_batch(&self, texts: &[String], input_type: InputType) -> Result<Vec<Vec<f32>>> {
        let request = EmbedRequest {
            model: &self.model,
            texts,
            input_type,
            truncate: "END",
        };

        let url = self
            .base_url
            .join("/v1/embed")
            .context("Failed to build embedding URL")?;

        let request_json =
            serde_json::to_string(&request).context("Failed to serialize embedding request")?;

        let response_text = send_with_retry(self.retry_attempts, || {
            self.agent
                .post(url.as_str())
                .header("Authorization", &format!("Bearer {}", self.api_key))
                .header("Content-Type", "application/json")
                .send(&request_json)
                .and_then(|mut resp| resp.body_mut().read_to_string())
        })
        .context("Failed to generate embeddings")?;

        let embed_response: EmbedResponse =
            serde_json::from_str(&response_text).context("Failed to parse embedding response")?;

        if embed_response.embeddings.len() != texts.len() {
            return Err(anyhow::anyhow!(
                "Mismatch between request and response counts: {} vs {}",
                texts.len(),
                embed_response.embeddings.len()
            ));
        }

        Ok(embed_response.embeddings)
    }
}
