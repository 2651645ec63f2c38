use async_trait::async_trait;

use crate::domain::{ContentKind, DomainError, Extraction};

/// Parses file content into logical constructs and import references.
///
/// Polymorphic over content kind: structured source is parsed into a
/// syntax tree and walked at declaration granularity; prose is chunked
/// into sections. A failure is scoped to the one file and must not abort
/// the surrounding run.
#[async_trait]
pub trait ExtractorService: Send + Sync {
    async fn extract(
        &self,
        content: &str,
        file_path: &str,
        kind: ContentKind,
    ) -> Result<Extraction, DomainError>;

    fn supported_kinds(&self) -> Vec<ContentKind>;

    fn supports(&self, kind: ContentKind) -> bool {
        self.supported_kinds().contains(&kind)
    }
}
