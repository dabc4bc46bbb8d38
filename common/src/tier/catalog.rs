// Active tier catalog
//
// Readers clone an `Arc` to an immutable snapshot under a short read lock.
// Writers validate a candidate off-lock, then swap it in only if the active
// version is still the one the candidate was built on (compare-and-swap), so
// two concurrent edits can never silently overwrite each other.

use super::{
    default_categories,
    edit::{apply_edits, CatalogEdit},
    validate, CatalogIntegrityError, Category, ReplaceError, ReplaceResult, Resolution,
    TierIndex, ValidationReport,
};
use log::{debug, info, warn};
use std::sync::{Arc, PoisonError, RwLock};

/// Version of the first catalog installed in a store
pub const INITIAL_VERSION: u64 = 1;

/// Immutable, indexed view of one catalog version
#[derive(Debug)]
pub struct CatalogSnapshot {
    version: u64,
    categories: Vec<Category>,
    index: TierIndex,
}

impl CatalogSnapshot {
    /// Validate `categories` and index them
    pub fn build(categories: Vec<Category>, version: u64) -> Result<Self, ValidationReport> {
        validate(&categories)?;
        Ok(Self::new_unchecked(categories, version))
    }

    /// Index `categories` without validating them.
    /// Resolving against an invalid catalog yields `CatalogIntegrityError`.
    pub fn new_unchecked(mut categories: Vec<Category>, version: u64) -> Self {
        for category in categories.iter_mut() {
            category
                .levels
                .sort_by_key(|level| level.requirements.min_referrals);
        }
        let index = TierIndex::build(&categories);
        Self {
            version,
            categories,
            index,
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn get_category(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|category| category.id == id)
    }

    pub fn level_count(&self) -> usize {
        self.index.len()
    }

    /// Unique level covering `referrals`, O(log n)
    pub fn resolve(&self, referrals: u64) -> Result<Resolution, CatalogIntegrityError> {
        let (c, l) = self.index.locate(&self.categories, referrals)?;
        let category = &self.categories[c];
        Ok(Resolution {
            category: category.summary(),
            level: category.levels[l].clone(),
        })
    }
}

/// Shared handle on the active catalog
#[derive(Debug)]
pub struct TierCatalog {
    active: RwLock<Arc<CatalogSnapshot>>,
}

impl TierCatalog {
    /// Validate `categories` and install them as version `INITIAL_VERSION`
    pub fn new(categories: Vec<Category>) -> Result<Self, ValidationReport> {
        CatalogSnapshot::build(categories, INITIAL_VERSION).map(Self::from_snapshot)
    }

    pub fn from_snapshot(snapshot: CatalogSnapshot) -> Self {
        Self {
            active: RwLock::new(Arc::new(snapshot)),
        }
    }

    /// Catalog holding the built-in tier table
    pub fn with_default_tiers() -> Self {
        // The built-in table is covered by the validator tests
        Self::from_snapshot(CatalogSnapshot::new_unchecked(
            default_categories(),
            INITIAL_VERSION,
        ))
    }

    pub fn snapshot(&self) -> Arc<CatalogSnapshot> {
        // The guarded value is a pointer swap, never left half-written
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn get_catalog(&self) -> Vec<Category> {
        self.snapshot().categories().to_vec()
    }

    pub fn version(&self) -> u64 {
        self.snapshot().version()
    }

    pub fn resolve(&self, referrals: u64) -> Result<Resolution, CatalogIntegrityError> {
        self.snapshot().resolve(referrals)
    }

    /// Validate `candidate` as the successor of the active catalog.
    /// Nothing is installed until `commit`.
    pub fn prepare(
        &self,
        candidate: Vec<Category>,
        expected_version: Option<u64>,
    ) -> ReplaceResult<CatalogSnapshot> {
        let active = self.snapshot();
        check_version(&active, expected_version)?;
        let next_version = active
            .version()
            .checked_add(1)
            .ok_or(ReplaceError::VersionExhausted {
                version: active.version(),
            })?;

        match CatalogSnapshot::build(candidate, next_version) {
            Ok(snapshot) => Ok(snapshot),
            Err(report) => {
                if log::log_enabled!(log::Level::Warn) {
                    warn!(
                        "Rejected tier catalog on top of version {}: {}",
                        active.version(),
                        report
                    );
                }
                Err(ReplaceError::Validation(report))
            }
        }
    }

    /// Apply `edit` to a copy of the active catalog and validate the result
    pub fn prepare_edit(
        &self,
        edit: CatalogEdit,
        expected_version: Option<u64>,
    ) -> ReplaceResult<CatalogSnapshot> {
        self.prepare_edits(vec![edit], expected_version)
    }

    /// Apply every edit to one copy of the active catalog; only the final
    /// result is validated
    pub fn prepare_edits(
        &self,
        edits: Vec<CatalogEdit>,
        expected_version: Option<u64>,
    ) -> ReplaceResult<CatalogSnapshot> {
        let active = self.snapshot();
        check_version(&active, expected_version)?;

        let mut candidate = active.categories().to_vec();
        apply_edits(&mut candidate, edits)?;
        self.prepare(candidate, Some(active.version()))
    }

    /// Install a prepared snapshot if no other commit happened since it was
    /// prepared
    pub fn commit(&self, snapshot: CatalogSnapshot) -> ReplaceResult<Arc<CatalogSnapshot>> {
        let mut active = self.active.write().unwrap_or_else(PoisonError::into_inner);

        let base = snapshot.version().saturating_sub(1);
        if active.version() != base {
            return Err(ReplaceError::VersionMismatch {
                expected: base,
                actual: active.version(),
            });
        }

        let snapshot = Arc::new(snapshot);
        *active = snapshot.clone();
        if log::log_enabled!(log::Level::Info) {
            info!(
                "Tier catalog version {} installed ({} levels)",
                snapshot.version(),
                snapshot.level_count()
            );
        }
        Ok(snapshot)
    }

    /// Validate and atomically install `candidate`, or leave the active
    /// catalog untouched
    pub fn replace_catalog(
        &self,
        candidate: Vec<Category>,
        expected_version: Option<u64>,
    ) -> ReplaceResult<Arc<CatalogSnapshot>> {
        let snapshot = self.prepare(candidate, expected_version)?;
        self.commit(snapshot)
    }

    pub fn edit(
        &self,
        edit: CatalogEdit,
        expected_version: Option<u64>,
    ) -> ReplaceResult<Arc<CatalogSnapshot>> {
        let snapshot = self.prepare_edit(edit, expected_version)?;
        self.commit(snapshot)
    }
}

fn check_version(active: &CatalogSnapshot, expected_version: Option<u64>) -> ReplaceResult<()> {
    match expected_version {
        Some(expected) if expected != active.version() => {
            debug!(
                "Stale catalog edit: expected version {}, active is {}",
                expected,
                active.version()
            );
            Err(ReplaceError::VersionMismatch {
                expected,
                actual: active.version(),
            })
        }
        _ => Ok(()),
    }
}
