use crate::core::error::ServiceError;
use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use fature_common::{
    api::{ErrorKind, ErrorResponse, FormErrorResponse, ValidationErrorResponse},
    tier::{EditError, ReplaceError},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("invalid If-Match header '{0}'")]
    InvalidIfMatch(String),

    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl ApiError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::BadRequest(_) | Self::InvalidIfMatch(_) => ErrorKind::BadRequest,
            Self::Service(e) => match e {
                ServiceError::Integrity(_) => ErrorKind::CatalogIntegrity,
                ServiceError::Replace(ReplaceError::Validation(_)) => ErrorKind::Validation,
                ServiceError::Replace(ReplaceError::VersionMismatch { .. }) => {
                    ErrorKind::VersionMismatch
                }
                ServiceError::Replace(ReplaceError::Edit(EditError::Form(_))) => {
                    ErrorKind::InvalidForm
                }
                ServiceError::Replace(ReplaceError::Edit(_)) => ErrorKind::NotFound,
                ServiceError::Replace(ReplaceError::VersionExhausted { .. })
                | ServiceError::Store(_)
                | ServiceError::StoredVersionExhausted(_)
                | ServiceError::InvalidStoredCatalog { .. }
                | ServiceError::EmptyStore(_) => ErrorKind::Storage,
            },
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::BadRequest | ErrorKind::InvalidForm => StatusCode::BAD_REQUEST,
            ErrorKind::CatalogIntegrity | ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::VersionMismatch => StatusCode::CONFLICT,
            ErrorKind::Validation => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::Storage => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut response = HttpResponse::build(self.status_code());
        match self {
            Self::Service(ServiceError::Replace(ReplaceError::Validation(report))) => {
                response.json(ValidationErrorResponse::from(report))
            }
            Self::Service(ServiceError::Replace(ReplaceError::Edit(EditError::Form(e)))) => {
                response.json(FormErrorResponse::from(e))
            }
            _ => response.json(ErrorResponse::new(self.kind(), self.to_string())),
        }
    }
}
