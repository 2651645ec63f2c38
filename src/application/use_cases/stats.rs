use std::sync::Arc;

use crate::application::ConstructStore;
use crate::domain::DomainError;

/// Record counts of the persisted store.
#[derive(Debug, Clone, Copy)]
pub struct StoreStats {
    pub constructs: u64,
    pub imports: u64,
}

pub struct StatsUseCase {
    store: Arc<dyn ConstructStore>,
}

impl StatsUseCase {
    pub fn new(store: Arc<dyn ConstructStore>) -> Self {
        Self { store }
    }

    pub async fn execute(&self) -> Result<StoreStats, DomainError> {
        Ok(StoreStats {
            constructs: self.store.construct_count().await?,
            imports: self.store.import_count().await?,
        })
    }
}
