use async_trait::async_trait;

use crate::domain::{DomainError, EmbeddingConfig};

/// Generates fixed-dimensionality vector embeddings from text.
///
/// Failures distinguish transient conditions
/// ([`DomainError::EmbeddingUnavailable`], the caller may retry on a
/// later run) from permanent rejection of the content
/// ([`DomainError::EmbeddingRejected`], do not retry until the content
/// changes).
#[async_trait]
pub trait EmbeddingService: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError>;

    fn config(&self) -> &EmbeddingConfig;
}
