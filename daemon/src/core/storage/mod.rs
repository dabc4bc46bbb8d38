mod json;
mod memory;

pub use self::{json::JsonFileStore, memory::MemoryStore};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fature_common::tier::{CatalogSnapshot, Category};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Catalog as persisted in the config store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoredCatalog {
    pub version: u64,
    pub updated_at: DateTime<Utc>,
    pub categories: Vec<Category>,
}

impl StoredCatalog {
    pub fn from_snapshot(snapshot: &CatalogSnapshot) -> Self {
        Self {
            version: snapshot.version(),
            updated_at: Utc::now(),
            categories: snapshot.categories().to_vec(),
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed tier catalog in {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("error while encoding tier catalog: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("catalog store is read-only")]
    ReadOnly,
}

// Persistence of the active catalog
// `save` must be atomic: a failed save leaves the previous catalog readable
#[async_trait]
pub trait CatalogStore: Send + Sync + 'static {
    /// Last saved catalog, `None` when nothing was ever saved
    async fn load(&self) -> Result<Option<StoredCatalog>, StoreError>;

    async fn save(&self, catalog: &StoredCatalog) -> Result<(), StoreError>;

    /// Human readable location, used in logs
    fn location(&self) -> String;
}
