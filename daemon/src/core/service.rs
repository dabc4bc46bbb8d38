// Catalog service
//
// Owns the active catalog and its store. Writers are serialised and each
// accepted catalog is persisted before it becomes visible, so the store never
// lags behind what readers see.

use super::{
    error::ServiceError,
    storage::{CatalogStore, StoredCatalog},
};
use crate::config::{
    METRIC_INTEGRITY_ERRORS, METRIC_REPLACE_COMMITTED, METRIC_REPLACE_REJECTED,
    METRIC_RESOLVE_REQUESTS,
};
use fature_common::tier::{
    default_categories, CatalogEdit, CatalogSnapshot, Category, ReplaceError, ReplaceResult,
    Resolution, TierCatalog, INITIAL_VERSION,
};
use log::{error, info, warn};
use metrics::counter;
use std::sync::Arc;
use tokio::sync::Mutex;

pub struct CatalogService<S: CatalogStore> {
    catalog: TierCatalog,
    store: S,
    // held across validate -> persist -> commit
    writer: Mutex<()>,
}

impl<S: CatalogStore> CatalogService<S> {
    /// Load the catalog from `store`, seeding the built-in tier table when the
    /// store is empty and `seed_default` is set.
    /// A stored catalog that fails validation is a boot error.
    pub async fn load(store: S, seed_default: bool) -> Result<Self, ServiceError> {
        let snapshot = match store.load().await? {
            Some(stored) => {
                if stored.version == u64::MAX {
                    return Err(ServiceError::StoredVersionExhausted(stored.version));
                }
                let version = stored.version.max(INITIAL_VERSION);
                let snapshot = CatalogSnapshot::build(stored.categories, version)
                    .map_err(|report| ServiceError::InvalidStoredCatalog { version, report })?;
                if log::log_enabled!(log::Level::Info) {
                    info!(
                        "Loaded tier catalog version {} ({} levels) from {}",
                        snapshot.version(),
                        snapshot.level_count(),
                        store.location()
                    );
                }
                snapshot
            }
            None if seed_default => {
                let snapshot = CatalogSnapshot::build(default_categories(), INITIAL_VERSION)
                    .map_err(|report| ServiceError::InvalidStoredCatalog {
                        version: INITIAL_VERSION,
                        report,
                    })?;
                store.save(&StoredCatalog::from_snapshot(&snapshot)).await?;
                if log::log_enabled!(log::Level::Info) {
                    info!(
                        "Seeded default tier catalog ({} levels) into {}",
                        snapshot.level_count(),
                        store.location()
                    );
                }
                snapshot
            }
            None => return Err(ServiceError::EmptyStore(store.location())),
        };

        Ok(Self::new(TierCatalog::from_snapshot(snapshot), store))
    }

    /// Serve an already installed catalog, persisting later versions to `store`
    pub fn new(catalog: TierCatalog, store: S) -> Self {
        Self {
            catalog,
            store,
            writer: Mutex::new(()),
        }
    }

    pub fn catalog(&self) -> &TierCatalog {
        &self.catalog
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn snapshot(&self) -> Arc<CatalogSnapshot> {
        self.catalog.snapshot()
    }

    pub fn resolve(&self, referrals: u64) -> Result<Resolution, ServiceError> {
        counter!(METRIC_RESOLVE_REQUESTS).increment(1);
        let snapshot = self.catalog.snapshot();
        snapshot.resolve(referrals).map_err(|e| {
            counter!(METRIC_INTEGRITY_ERRORS).increment(1);
            error!(
                "CRITICAL: tier catalog version {} is corrupt: {}",
                snapshot.version(),
                e
            );
            ServiceError::Integrity(e)
        })
    }

    /// Replace the whole catalog
    pub async fn replace(
        &self,
        candidate: Vec<Category>,
        expected_version: Option<u64>,
    ) -> Result<Arc<CatalogSnapshot>, ServiceError> {
        let _guard = self.writer.lock().await;
        let prepared = self.catalog.prepare(candidate, expected_version);
        self.install(prepared).await
    }

    /// Apply a single level edit
    pub async fn edit(
        &self,
        edit: CatalogEdit,
        expected_version: Option<u64>,
    ) -> Result<Arc<CatalogSnapshot>, ServiceError> {
        self.edit_batch(vec![edit], expected_version).await
    }

    /// Apply several level edits as one catalog version
    pub async fn edit_batch(
        &self,
        edits: Vec<CatalogEdit>,
        expected_version: Option<u64>,
    ) -> Result<Arc<CatalogSnapshot>, ServiceError> {
        let _guard = self.writer.lock().await;
        let prepared = self.catalog.prepare_edits(edits, expected_version);
        self.install(prepared).await
    }

    // Caller holds the writer lock
    async fn install(
        &self,
        prepared: ReplaceResult<CatalogSnapshot>,
    ) -> Result<Arc<CatalogSnapshot>, ServiceError> {
        let snapshot = match prepared {
            Ok(snapshot) => snapshot,
            Err(e) => {
                if matches!(e, ReplaceError::Validation(_)) {
                    counter!(METRIC_REPLACE_REJECTED).increment(1);
                }
                return Err(e.into());
            }
        };

        if let Err(e) = self
            .store
            .save(&StoredCatalog::from_snapshot(&snapshot))
            .await
        {
            if log::log_enabled!(log::Level::Warn) {
                warn!(
                    "Tier catalog version {} not installed, store {} failed: {}",
                    snapshot.version(),
                    self.store.location(),
                    e
                );
            }
            return Err(e.into());
        }

        let active = self.catalog.commit(snapshot)?;
        counter!(METRIC_REPLACE_COMMITTED).increment(1);
        Ok(active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::storage::{MemoryStore, StoreError};
    use chrono::Utc;
    use fature_common::tier::{form::LevelForm, CatalogIntegrityError, Invariant};

    async fn seeded() -> CatalogService<MemoryStore> {
        CatalogService::load(MemoryStore::new(), true).await.unwrap()
    }

    #[tokio::test]
    async fn test_seeds_empty_store() {
        let service = seeded().await;
        assert_eq!(service.snapshot().version(), INITIAL_VERSION);

        let stored = service.store().load().await.unwrap().unwrap();
        assert_eq!(stored.version, INITIAL_VERSION);
        assert_eq!(stored.categories, default_categories());
    }

    #[tokio::test]
    async fn test_empty_store_without_seed() {
        let result = CatalogService::load(MemoryStore::new(), false).await;
        assert!(matches!(result, Err(ServiceError::EmptyStore(_))));
    }

    #[tokio::test]
    async fn test_invalid_stored_catalog_fails_boot() {
        let mut categories = default_categories();
        categories[0].levels[1].requirements.min_referrals = 6;
        let store = MemoryStore::with_catalog(StoredCatalog {
            version: 4,
            updated_at: Utc::now(),
            categories,
        });

        match CatalogService::load(store, true).await {
            Err(ServiceError::InvalidStoredCatalog { version, report }) => {
                assert_eq!(version, 4);
                assert!(report.contains(Invariant::Gap));
            }
            Err(e) => panic!("unexpected error {}", e),
            Ok(_) => panic!("invalid catalog accepted"),
        }
    }

    #[tokio::test]
    async fn test_loads_stored_version() {
        let store = MemoryStore::with_catalog(StoredCatalog {
            version: 7,
            updated_at: Utc::now(),
            categories: default_categories(),
        });
        let service = CatalogService::load(store, false).await.unwrap();
        assert_eq!(service.snapshot().version(), 7);
        assert_eq!(service.resolve(95).unwrap().level.id, "level-7");
    }

    #[tokio::test]
    async fn test_exhausted_stored_version_fails_boot() {
        let store = MemoryStore::with_catalog(StoredCatalog {
            version: u64::MAX,
            updated_at: Utc::now(),
            categories: default_categories(),
        });
        assert!(matches!(
            CatalogService::load(store, true).await,
            Err(ServiceError::StoredVersionExhausted(u64::MAX))
        ));
    }

    #[tokio::test]
    async fn test_last_version_is_still_writable_once() {
        let store = MemoryStore::with_catalog(StoredCatalog {
            version: u64::MAX - 1,
            updated_at: Utc::now(),
            categories: default_categories(),
        });
        let service = CatalogService::load(store, false).await.unwrap();

        let snapshot = service.replace(default_categories(), None).await.unwrap();
        assert_eq!(snapshot.version(), u64::MAX);

        let result = service.replace(default_categories(), None).await;
        assert!(matches!(
            result,
            Err(ServiceError::Replace(ReplaceError::VersionExhausted { .. }))
        ));
        assert_eq!(service.store().load().await.unwrap().unwrap().version, u64::MAX);
    }

    #[tokio::test]
    async fn test_replace_persists_then_commits() {
        let service = seeded().await;
        let mut categories = default_categories();
        categories[6].levels[2].benefits.rev_total = 75.0;

        let snapshot = service.replace(categories.clone(), Some(1)).await.unwrap();
        assert_eq!(snapshot.version(), 2);

        let stored = service.store().load().await.unwrap().unwrap();
        assert_eq!(stored.version, 2);
        assert_eq!(stored.categories, categories);
    }

    #[tokio::test]
    async fn test_rejected_replace_changes_nothing() {
        let service = seeded().await;
        let mut categories = default_categories();
        categories[2].levels[0].requirements.max_referrals = 45;

        match service.replace(categories, None).await {
            Err(ServiceError::Replace(ReplaceError::Validation(report))) => {
                assert!(report.contains(Invariant::Overlap));
            }
            other => panic!("expected validation error, got {:?}", other.map(|s| s.version())),
        }
        assert_eq!(service.snapshot().version(), 1);
        assert_eq!(service.store().load().await.unwrap().unwrap().version, 1);
    }

    #[tokio::test]
    async fn test_store_failure_leaves_catalog_active() {
        let service = seeded().await;
        service.store().set_read_only(true);

        let result = service.replace(default_categories(), None).await;
        assert!(matches!(
            result,
            Err(ServiceError::Store(StoreError::ReadOnly))
        ));
        assert_eq!(service.snapshot().version(), 1);

        service.store().set_read_only(false);
        let snapshot = service.replace(default_categories(), Some(1)).await.unwrap();
        assert_eq!(snapshot.version(), 2);
    }

    #[tokio::test]
    async fn test_stale_version_is_rejected() {
        let service = seeded().await;
        service.replace(default_categories(), Some(1)).await.unwrap();

        let result = service.replace(default_categories(), Some(1)).await;
        assert!(matches!(
            result,
            Err(ServiceError::Replace(ReplaceError::VersionMismatch {
                expected: 1,
                actual: 2
            }))
        ));
    }

    #[tokio::test]
    async fn test_edit_goes_through_validation() {
        let service = seeded().await;
        let form = LevelForm {
            min_referrals: "0".to_string(),
            max_referrals: "4".to_string(),
            rev_total: "5,5".to_string(),
            rev_level1: "3".to_string(),
            rev_levels2to5: "0,5".to_string(),
            ..Default::default()
        };
        let snapshot = service
            .edit(
                CatalogEdit::UpdateLevel {
                    category_id: "jogador".to_string(),
                    level_id: "level-1".to_string(),
                    form,
                },
                None,
            )
            .await
            .unwrap();
        assert_eq!(snapshot.categories()[0].levels[0].benefits.rev_total, 5.5);

        // removing a middle level opens a gap
        let result = service
            .edit(
                CatalogEdit::RemoveLevel {
                    category_id: "jogador".to_string(),
                    level_id: "level-2".to_string(),
                },
                None,
            )
            .await;
        assert!(matches!(
            result,
            Err(ServiceError::Replace(ReplaceError::Validation(_)))
        ));
        assert_eq!(service.snapshot().version(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_writers_with_same_version() {
        let service = Arc::new(seeded().await);
        let mut tasks = Vec::new();
        for _ in 0..8 {
            let service = service.clone();
            tasks.push(tokio::spawn(async move {
                service.replace(default_categories(), Some(1)).await.is_ok()
            }));
        }

        let mut accepted = 0;
        for task in tasks {
            if task.await.unwrap() {
                accepted += 1;
            }
        }
        assert_eq!(accepted, 1);
        assert_eq!(service.snapshot().version(), 2);
    }

    #[tokio::test]
    async fn test_integrity_error_is_propagated() {
        let mut categories = default_categories();
        categories[1].levels[0].requirements.min_referrals = 16;
        let service = CatalogService::new(
            TierCatalog::from_snapshot(CatalogSnapshot::new_unchecked(categories, 1)),
            MemoryStore::new(),
        );
        assert!(matches!(
            service.resolve(15),
            Err(ServiceError::Integrity(CatalogIntegrityError::NoMatch {
                referrals: 15
            }))
        ));
    }
}
