use super::storage::StoreError;
use fature_common::tier::{CatalogIntegrityError, ReplaceError, ValidationReport};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Integrity(#[from] CatalogIntegrityError),

    #[error(transparent)]
    Replace(#[from] ReplaceError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("stored tier catalog version {version} is invalid: {report}")]
    InvalidStoredCatalog {
        version: u64,
        report: ValidationReport,
    },

    #[error("stored tier catalog version {0} leaves no room for further versions")]
    StoredVersionExhausted(u64),

    #[error("no tier catalog found in {0} and default seeding is disabled")]
    EmptyStore(String),
}
