use serde::{Deserialize, Serialize};

/// Configuration for the embedding model in use. Model identity and
/// vector dimensionality are configuration, never hard-coded by callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    model_name: String,
    dimensions: usize,
    max_input_chars: usize,
}

impl EmbeddingConfig {
    pub fn new(model_name: String, dimensions: usize, max_input_chars: usize) -> Self {
        Self {
            model_name,
            dimensions,
            max_input_chars,
        }
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn max_input_chars(&self) -> usize {
        self.max_input_chars
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model_name: "mock-embedding".to_string(),
            dimensions: 384,
            max_input_chars: 8192,
        }
    }
}
