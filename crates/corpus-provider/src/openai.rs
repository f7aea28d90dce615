//! OpenAI-compatible embedding provider.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use corpus_types::ProviderSettings;

use crate::{EmbeddingProvider, ProviderError};

/// Configuration for the OpenAI embedding client.
#[derive(Debug, Clone)]
pub struct OpenAiProviderConfig {
    /// API base URL (e.g., "https://api.openai.com/v1")
    pub base_url: String,

    /// Embedding model (e.g., "text-embedding-ada-002")
    pub model: String,

    /// API key
    pub api_key: SecretString,

    /// Request timeout
    pub timeout: Duration,
}

impl OpenAiProviderConfig {
    /// Create config for the OpenAI API with default endpoint and timeout.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: model.into(),
            api_key: SecretString::from(api_key.into()),
            timeout: Duration::from_secs(60),
        }
    }

    /// Build config from loaded settings.
    ///
    /// The API key is required: its absence is a configuration error and
    /// the pipeline must not start without it.
    pub fn from_settings(settings: &ProviderSettings) -> Result<Self, ProviderError> {
        let api_key = settings.api_key.clone().ok_or_else(|| {
            ProviderError::Config("provider.api_key is not set".to_string())
        })?;

        Ok(Self {
            base_url: settings.base_url.clone(),
            model: settings.model.clone(),
            api_key: SecretString::from(api_key),
            timeout: Duration::from_secs(settings.timeout_secs),
        })
    }
}

/// Embedding provider backed by the OpenAI embeddings endpoint.
pub struct OpenAiProvider {
    client: Client,
    config: OpenAiProviderConfig,
}

impl OpenAiProvider {
    /// Create a new provider handle.
    pub fn new(config: OpenAiProviderConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ProviderError::Config(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Make one embeddings request for `inputs`.
    async fn request_embeddings(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, ProviderError> {
        #[derive(Serialize)]
        struct EmbeddingsRequest<'a> {
            model: &'a str,
            input: &'a [String],
        }

        #[derive(Deserialize)]
        struct EmbeddingsResponse {
            data: Vec<EmbeddingRow>,
        }

        #[derive(Deserialize)]
        struct EmbeddingRow {
            index: usize,
            embedding: Vec<f32>,
        }

        let request = EmbeddingsRequest {
            model: &self.config.model,
            input: inputs,
        };

        let url = format!("{}/embeddings", self.config.base_url);

        let response = self
            .client
            .post(&url)
            .header(
                "Authorization",
                format!("Bearer {}", self.config.api_key.expose_secret()),
            )
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::Api(e.to_string()))?;

        if response.status() == 429 {
            return Err(ProviderError::RateLimited);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api(format!("HTTP {}: {}", status, body)));
        }

        let body: EmbeddingsResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        if body.data.len() != inputs.len() {
            return Err(ProviderError::Parse(format!(
                "expected {} embeddings, got {}",
                inputs.len(),
                body.data.len()
            )));
        }

        // Rows carry an index field and are not guaranteed to arrive in
        // request order; realign them so the result is positional.
        let mut slots: Vec<Option<Vec<f32>>> = vec![None; inputs.len()];
        for row in body.data {
            let slot = slots.get_mut(row.index).ok_or_else(|| {
                ProviderError::Parse(format!("embedding index {} out of range", row.index))
            })?;
            *slot = Some(row.embedding);
        }

        slots
            .into_iter()
            .enumerate()
            .map(|(i, slot)| {
                slot.ok_or_else(|| {
                    ProviderError::Parse(format!("no embedding returned for input {}", i))
                })
            })
            .collect()
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiProvider {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ProviderError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        debug!(count = texts.len(), model = %self.config.model, "Requesting batch embeddings");
        self.request_embeddings(texts).await
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        let input = [text.to_string()];
        let mut vectors = self.request_embeddings(&input).await?;
        vectors
            .pop()
            .ok_or_else(|| ProviderError::Parse("empty embeddings response".to_string()))
    }
}
