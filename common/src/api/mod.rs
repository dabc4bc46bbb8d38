// Request and response bodies of the tier HTTP API

use crate::tier::{FormError, Invariant, LevelRef, ValidationReport, Violation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveParams {
    pub referrals: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub catalog_version: u64,
}

/// Machine-readable error class
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    BadRequest,
    CatalogIntegrity,
    NotFound,
    VersionMismatch,
    Validation,
    InvalidForm,
    Storage,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: ErrorKind,
}

impl ErrorResponse {
    pub fn new<S: Into<String>>(kind: ErrorKind, error: S) -> Self {
        Self {
            error: error.into(),
            kind,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ViolationEntry {
    pub invariant: Invariant,
    pub message: String,
    pub levels: Vec<LevelRef>,
}

impl From<&Violation> for ViolationEntry {
    fn from(violation: &Violation) -> Self {
        Self {
            invariant: violation.invariant(),
            message: violation.to_string(),
            levels: violation.levels().into_iter().cloned().collect(),
        }
    }
}

/// Body of a 422 response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationErrorResponse {
    pub error: String,
    pub kind: ErrorKind,
    pub violations: Vec<ViolationEntry>,
}

impl From<&ValidationReport> for ValidationErrorResponse {
    fn from(report: &ValidationReport) -> Self {
        Self {
            error: format!("tier catalog rejected with {} violation(s)", report.len()),
            kind: ErrorKind::Validation,
            violations: report.violations().iter().map(ViolationEntry::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldErrorEntry {
    pub field: String,
    pub value: String,
    pub reason: String,
}

/// Body of a 400 response to an unparsable level form
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FormErrorResponse {
    pub error: String,
    pub kind: ErrorKind,
    pub fields: Vec<FieldErrorEntry>,
}

impl From<&FormError> for FormErrorResponse {
    fn from(err: &FormError) -> Self {
        Self {
            error: err.to_string(),
            kind: ErrorKind::InvalidForm,
            fields: err
                .fields
                .iter()
                .map(|field| FieldErrorEntry {
                    field: field.field.to_string(),
                    value: field.value.clone(),
                    reason: field.reason.to_string(),
                })
                .collect(),
        }
    }
}
