use std::sync::Arc;
use std::time::Duration;

use futures_util::future::try_join_all;
use tokio::sync::Semaphore;
use tracing::debug;

use crate::application::EmbeddingService;
use crate::domain::{split_for_embedding, DomainError};

/// Front door to the embedding collaborator. Applies the size guard
/// before any external call: text under the ceiling goes out as a single
/// request, oversized text is split into overlapping line-boundary
/// sub-spans and the resulting vectors are mean-pooled back into one.
///
/// Outstanding requests across all callers are bounded by a semaphore,
/// and each request runs under a timeout; an elapsed timeout is treated
/// as [`DomainError::EmbeddingUnavailable`].
pub struct EmbeddingRequester {
    service: Arc<dyn EmbeddingService>,
    chunk_size: usize,
    chunk_overlap: usize,
    semaphore: Arc<Semaphore>,
    timeout: Duration,
}

impl EmbeddingRequester {
    pub fn new(
        service: Arc<dyn EmbeddingService>,
        chunk_size: usize,
        chunk_overlap: usize,
        concurrency: usize,
        timeout: Duration,
    ) -> Self {
        let max_input = service.config().max_input_chars();
        Self {
            service,
            // A sub-span must never exceed what a single request accepts.
            chunk_size: chunk_size.min(max_input).max(1),
            chunk_overlap,
            semaphore: Arc::new(Semaphore::new(concurrency.max(1))),
            timeout,
        }
    }

    pub async fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError> {
        let max_input = self.service.config().max_input_chars();

        if text.len() <= max_input {
            return self.request(text).await;
        }

        let spans = split_for_embedding(text, self.chunk_size, self.chunk_overlap);
        debug!(
            "Input of {} chars exceeds ceiling {}, embedding {} sub-spans",
            text.len(),
            max_input,
            spans.len()
        );

        let vectors = try_join_all(spans.iter().map(|span| self.request(span))).await?;
        Ok(mean_pool(vectors))
    }

    async fn request(&self, text: &str) -> Result<Vec<f32>, DomainError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|e| DomainError::internal(format!("Semaphore closed: {}", e)))?;

        match tokio::time::timeout(self.timeout, self.service.embed(text)).await {
            Ok(result) => result,
            Err(_) => Err(DomainError::embedding_unavailable(format!(
                "Request timed out after {:.0?}",
                self.timeout
            ))),
        }
    }
}

/// Element-wise mean of the sub-span vectors. Dimensionality is fixed per
/// model, so the pooled vector keeps the configured dimensionality.
fn mean_pool(mut vectors: Vec<Vec<f32>>) -> Vec<f32> {
    if vectors.len() == 1 {
        return vectors.remove(0);
    }

    let count = vectors.len() as f32;
    let mut pooled = vec![0.0f32; vectors.first().map_or(0, |v| v.len())];
    for vector in &vectors {
        for (acc, value) in pooled.iter_mut().zip(vector.iter()) {
            *acc += value;
        }
    }
    for value in &mut pooled {
        *value /= count;
    }
    pooled
}
