use super::{CatalogStore, StoreError, StoredCatalog};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

/// Volatile store, for tests and throwaway instances
#[derive(Debug, Default)]
pub struct MemoryStore {
    catalog: RwLock<Option<StoredCatalog>>,
    read_only: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_catalog(catalog: StoredCatalog) -> Self {
        Self {
            catalog: RwLock::new(Some(catalog)),
            read_only: AtomicBool::new(false),
        }
    }

    /// Reject every save with `StoreError::ReadOnly`
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::SeqCst);
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn load(&self) -> Result<Option<StoredCatalog>, StoreError> {
        Ok(self.catalog.read().await.clone())
    }

    async fn save(&self, catalog: &StoredCatalog) -> Result<(), StoreError> {
        if self.read_only.load(Ordering::SeqCst) {
            return Err(StoreError::ReadOnly);
        }
        *self.catalog.write().await = Some(catalog.clone());
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
