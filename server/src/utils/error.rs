use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{debug, error, warn, Level};

use crate::services::catalog::CatalogError;
use crate::services::checkout::CheckoutError;
use crate::services::organizer::OrganizerError;
use crate::utils::response::error as error_response;
use crate::utils::validation::FieldErrors;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Validation error: {0}")]
    InvalidFields(FieldErrors),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error")]
    InternalServerError(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::InvalidFields(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) | AppError::InvalidFields(_) => "VALIDATION_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    fn log_level(&self) -> Level {
        match self {
            // Rejected user input is routine.
            AppError::ValidationError(_) | AppError::InvalidFields(_) | AppError::NotFound(_) => {
                Level::DEBUG
            }
            // A client acting on a stale step.
            AppError::Conflict(_) => Level::WARN,
            AppError::InternalServerError(_) => Level::ERROR,
        }
    }

    fn log(&self) {
        match self.log_level() {
            Level::ERROR => error!(error = ?self, "Internal error"),
            Level::WARN => warn!(code = self.code(), error = %self, "Request conflicts with state"),
            _ => debug!(code = self.code(), error = %self, "Request rejected"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();

        self.log();

        let (public_message, details) = match &self {
            AppError::InvalidFields(fields) => (
                "One or more fields are invalid".to_string(),
                Some(fields.to_json()),
            ),
            AppError::ValidationError(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg) => (msg.clone(), None),
            AppError::InternalServerError(_) => ("An internal error occurred".to_string(), None),
        };

        error_response(code, public_message, details, status)
    }
}

impl From<FieldErrors> for AppError {
    fn from(errors: FieldErrors) -> Self {
        AppError::InvalidFields(errors)
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::EventNotFound(_) => AppError::NotFound(err.to_string()),
            CatalogError::InvalidQuery(_) => AppError::ValidationError(err.to_string()),
        }
    }
}

impl From<CheckoutError> for AppError {
    fn from(err: CheckoutError) -> Self {
        match err {
            CheckoutError::InvalidFields(fields) => AppError::InvalidFields(fields),
            CheckoutError::SessionNotFound(_) | CheckoutError::EventNotFound(_) => {
                AppError::NotFound(err.to_string())
            }
            CheckoutError::TermsNotAccepted
            | CheckoutError::EmptySelection
            | CheckoutError::UnknownTicketType(_)
            | CheckoutError::InsufficientInventory { .. } => {
                AppError::ValidationError(err.to_string())
            }
            CheckoutError::InvalidTransition { .. } | CheckoutError::PaymentInProgress => {
                AppError::Conflict(err.to_string())
            }
            CheckoutError::AmountOverflow => AppError::ValidationError(err.to_string()),
        }
    }
}

impl From<OrganizerError> for AppError {
    fn from(err: OrganizerError) -> Self {
        match err {
            OrganizerError::InvalidFields(fields) => AppError::InvalidFields(fields),
            OrganizerError::EventNotFound(_) => AppError::NotFound(err.to_string()),
            OrganizerError::AmountOverflow => AppError::InternalServerError(err.to_string()),
        }
    }
}
