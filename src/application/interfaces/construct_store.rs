use async_trait::async_trait;

use crate::domain::{
    ConstructKey, DomainError, ImportKey, ImportReference, SourceConstruct,
};

/// Durable document store for constructs and imports.
///
/// Implementations must enforce both identity uniqueness constraints:
/// constructs on (filename, line_start, line_end) and imports on
/// (filename, module_name). The constraint is the sole serialization
/// point under concurrent writers: racing upserts on the same key must
/// converge on one record, last writer winning on `updated_at`.
#[async_trait]
pub trait ConstructStore: Send + Sync {
    async fn find_construct(
        &self,
        key: &ConstructKey,
    ) -> Result<Option<SourceConstruct>, DomainError>;

    async fn upsert_construct(&self, construct: &SourceConstruct) -> Result<(), DomainError>;

    async fn find_import(&self, key: &ImportKey) -> Result<Option<ImportReference>, DomainError>;

    async fn upsert_import(&self, import: &ImportReference) -> Result<(), DomainError>;

    async fn construct_count(&self) -> Result<u64, DomainError>;

    async fn import_count(&self) -> Result<u64, DomainError>;
}
