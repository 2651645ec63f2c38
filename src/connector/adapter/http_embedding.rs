use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;

use crate::application::EmbeddingService;
use crate::domain::{DomainError, EmbeddingConfig};

/// Default target: Ollama running locally on its standard port.
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";
const EMBEDDINGS_PATH: &str = "/api/embeddings";
const DEFAULT_MODEL: &str = "nomic-embed-text";
const DEFAULT_DIMENSIONS: usize = 768;
const DEFAULT_MAX_INPUT_CHARS: usize = 8192;

#[derive(serde::Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct ApiResponse {
    embedding: Vec<f32>,
}

/// HTTP client for an Ollama-compatible embeddings endpoint.
///
/// **Local-first defaults**: targets Ollama on `http://localhost:11434`.
/// Override via environment variables:
///
/// ```text
/// EMBD_EMBEDDING_BASE_URL=http://embeddings.internal:11434
/// EMBD_EMBEDDING_MODEL=nomic-embed-text
/// EMBD_EMBEDDING_DIMENSIONS=768
/// ```
///
/// Failure mapping follows the pipeline's retry semantics: connection
/// errors, timeouts, and 5xx responses are transient
/// (`EmbeddingUnavailable`); any other 4xx means the service rejected
/// this content (`EmbeddingRejected`) and a retry is pointless until the
/// content changes.
pub struct HttpEmbedding {
    client: reqwest::Client,
    config: EmbeddingConfig,
    model: String,
    url: String,
}

impl HttpEmbedding {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        dimensions: usize,
        timeout: Duration,
    ) -> Self {
        let base: String = base_url.into();
        let url = format!("{}{}", base.trim_end_matches('/'), EMBEDDINGS_PATH);
        let model: String = model.into();
        Self {
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            config: EmbeddingConfig::new(model.clone(), dimensions, DEFAULT_MAX_INPUT_CHARS),
            model,
            url,
        }
    }

    /// Construct from environment variables with local-first defaults:
    ///
    /// | Variable                     | Default                  |
    /// |------------------------------|--------------------------|
    /// | `EMBD_EMBEDDING_BASE_URL`    | `http://localhost:11434` |
    /// | `EMBD_EMBEDDING_MODEL`       | `nomic-embed-text`       |
    /// | `EMBD_EMBEDDING_DIMENSIONS`  | `768`                    |
    pub fn from_env(timeout: Duration) -> Self {
        let base = std::env::var("EMBD_EMBEDDING_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let model = std::env::var("EMBD_EMBEDDING_MODEL")
            .unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let dimensions = std::env::var("EMBD_EMBEDDING_DIMENSIONS")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(DEFAULT_DIMENSIONS);
        Self::new(base, model, dimensions, timeout)
    }
}

#[async_trait]
impl EmbeddingService for HttpEmbedding {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError> {
        let request = ApiRequest {
            model: &self.model,
            prompt: text,
        };

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                DomainError::embedding_unavailable(format!(
                    "Request to {} failed: {}",
                    self.url, e
                ))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Embedding endpoint returned {status}: {body}");
            return if status.is_server_error()
                || status == reqwest::StatusCode::TOO_MANY_REQUESTS
                || status == reqwest::StatusCode::REQUEST_TIMEOUT
            {
                Err(DomainError::embedding_unavailable(format!(
                    "Endpoint returned {status}"
                )))
            } else {
                Err(DomainError::embedding_rejected(format!(
                    "Endpoint returned {status}"
                )))
            };
        }

        let api_response: ApiResponse = response.json().await.map_err(|e| {
            DomainError::embedding_unavailable(format!("Failed to parse response: {}", e))
        })?;

        if api_response.embedding.len() != self.config.dimensions() {
            return Err(DomainError::internal(format!(
                "Unexpected embedding dimension: {} (expected {})",
                api_response.embedding.len(),
                self.config.dimensions()
            )));
        }

        Ok(api_response.embedding)
    }

    fn config(&self) -> &EmbeddingConfig {
        &self.config
    }
}
