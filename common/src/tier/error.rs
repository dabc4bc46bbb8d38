// Tier catalog error types

use super::{form::FormError, Category, Level, ValidationReport};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Identifies a level by its category and its own id / name
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LevelRef {
    pub category_id: String,
    pub category_name: String,
    pub level_id: String,
    pub level_name: String,
}

impl LevelRef {
    pub fn new(category: &Category, level: &Level) -> Self {
        Self {
            category_id: category.id.clone(),
            category_name: category.name.clone(),
            level_id: level.id.clone(),
            level_name: level.name.clone(),
        }
    }
}

impl fmt::Display for LevelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.category_name, self.level_name)
    }
}

/// The active catalog did not yield exactly one level for a referral count.
/// Only reachable if an unvalidated catalog was installed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CatalogIntegrityError {
    #[error("catalog integrity violated: no level covers {referrals} referrals")]
    NoMatch { referrals: u64 },

    #[error("catalog integrity violated: {referrals} referrals matched both {first} and {second}")]
    Ambiguous {
        referrals: u64,
        first: LevelRef,
        second: LevelRef,
    },
}

impl CatalogIntegrityError {
    pub fn referrals(&self) -> u64 {
        match self {
            Self::NoMatch { referrals } | Self::Ambiguous { referrals, .. } => *referrals,
        }
    }
}

/// Errors produced by a level edit before validation
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EditError {
    #[error("category '{0}' not found")]
    CategoryNotFound(String),

    #[error("level '{level}' not found in category '{category}'")]
    LevelNotFound { category: String, level: String },

    #[error(transparent)]
    Form(#[from] FormError),
}

/// Why a candidate catalog was not installed
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ReplaceError {
    #[error("catalog rejected: {0}")]
    Validation(ValidationReport),

    #[error("catalog version mismatch: expected {expected}, active is {actual}")]
    VersionMismatch { expected: u64, actual: u64 },

    #[error("catalog version {version} is the last one available")]
    VersionExhausted { version: u64 },

    #[error(transparent)]
    Edit(#[from] EditError),
}

impl From<ValidationReport> for ReplaceError {
    fn from(report: ValidationReport) -> Self {
        Self::Validation(report)
    }
}

pub type ReplaceResult<T> = Result<T, ReplaceError>;
