use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not a repository: {0}")]
    NotARepository(String),

    #[error("Parse failure: {0}")]
    ParseFailure(String),

    #[error("Embedding unavailable: {0}")]
    EmbeddingUnavailable(String),

    #[error("Embedding rejected: {0}")]
    EmbeddingRejected(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn not_a_repository(msg: impl Into<String>) -> Self {
        Self::NotARepository(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseFailure(msg.into())
    }

    pub fn embedding_unavailable(msg: impl Into<String>) -> Self {
        Self::EmbeddingUnavailable(msg.into())
    }

    pub fn embedding_rejected(msg: impl Into<String>) -> Self {
        Self::EmbeddingRejected(msg.into())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::StoreUnavailable(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn is_parse_failure(&self) -> bool {
        matches!(self, Self::ParseFailure(_))
    }

    /// Transient failures are safe to retry on a later run without any
    /// state cleanup.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::EmbeddingUnavailable(_) | Self::StoreUnavailable(_)
        )
    }

    /// Run-fatal failures abort the current pass; everything else is
    /// recorded per file and the run continues.
    pub fn is_run_fatal(&self) -> bool {
        matches!(self, Self::NotARepository(_) | Self::StoreUnavailable(_))
    }
}
