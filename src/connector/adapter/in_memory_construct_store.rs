use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::application::ConstructStore;
use crate::domain::{
    ConstructKey, DomainError, ImportKey, ImportReference, SourceConstruct,
};

/// Non-durable store for tests and `--memory-storage` runs. Keying the
/// maps by the identity tuples enforces both uniqueness constraints by
/// construction: an upsert at an existing key replaces the record.
pub struct InMemoryConstructStore {
    constructs: Arc<Mutex<HashMap<ConstructKey, SourceConstruct>>>,
    imports: Arc<Mutex<HashMap<ImportKey, ImportReference>>>,
}

impl InMemoryConstructStore {
    pub fn new() -> Self {
        Self {
            constructs: Arc::new(Mutex::new(HashMap::new())),
            imports: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryConstructStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConstructStore for InMemoryConstructStore {
    async fn find_construct(
        &self,
        key: &ConstructKey,
    ) -> Result<Option<SourceConstruct>, DomainError> {
        let constructs = self.constructs.lock().await;
        Ok(constructs.get(key).cloned())
    }

    async fn upsert_construct(&self, construct: &SourceConstruct) -> Result<(), DomainError> {
        let mut constructs = self.constructs.lock().await;
        constructs.insert(construct.key(), construct.clone());
        debug!("Upserted construct {}", construct.location());
        Ok(())
    }

    async fn find_import(&self, key: &ImportKey) -> Result<Option<ImportReference>, DomainError> {
        let imports = self.imports.lock().await;
        Ok(imports.get(key).cloned())
    }

    async fn upsert_import(&self, import: &ImportReference) -> Result<(), DomainError> {
        let mut imports = self.imports.lock().await;
        imports.insert(import.key(), import.clone());
        Ok(())
    }

    async fn construct_count(&self) -> Result<u64, DomainError> {
        let constructs = self.constructs.lock().await;
        Ok(constructs.len() as u64)
    }

    async fn import_count(&self) -> Result<u64, DomainError> {
        let imports = self.imports.lock().await;
        Ok(imports.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ConstructKind, ImportType};

    fn construct(code: &str) -> SourceConstruct {
        SourceConstruct::new(
            "src/app.py".to_string(),
            "c0ffee".to_string(),
            ConstructKind::Function,
            "handler".to_string(),
            5,
            14,
            code.to_string(),
        )
    }

    #[tokio::test]
    async fn test_upsert_same_key_overwrites_instead_of_duplicating() {
        let store = InMemoryConstructStore::new();

        store
            .upsert_construct(&construct("def handler(): pass"))
            .await
            .unwrap();
        store
            .upsert_construct(&construct("def handler(): return 1"))
            .await
            .unwrap();

        assert_eq!(store.construct_count().await.unwrap(), 1);
        let found = store
            .find_construct(&ConstructKey::new("src/app.py", 5, 14))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.code(), "def handler(): return 1");
    }

    #[tokio::test]
    async fn test_distinct_spans_are_distinct_records() {
        let store = InMemoryConstructStore::new();

        let first = construct("def handler(): pass");
        let second = SourceConstruct::new(
            "src/app.py".to_string(),
            "c0ffee".to_string(),
            ConstructKind::Function,
            "other".to_string(),
            20,
            24,
            "def other(): pass".to_string(),
        );
        store.upsert_construct(&first).await.unwrap();
        store.upsert_construct(&second).await.unwrap();

        assert_eq!(store.construct_count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_import_identity_is_filename_and_module() {
        let store = InMemoryConstructStore::new();

        let import = ImportReference::new(
            "src/app.py".to_string(),
            "demo".to_string(),
            "os".to_string(),
            ImportType::Direct,
        );
        store.upsert_import(&import).await.unwrap();
        store.upsert_import(&import).await.unwrap();

        assert_eq!(store.import_count().await.unwrap(), 1);
        let found = store
            .find_import(&ImportKey::new("src/app.py", "os"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.module_name(), "os");
    }
}
