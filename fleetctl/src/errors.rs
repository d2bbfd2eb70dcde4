use crate::db::errors::{DbError, ErrorKind};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum Error {
    /// Credentials missing or wrong
    #[error("Not authenticated")]
    Unauthenticated { message: Option<String> },

    /// Requested resource not found
    #[error("{resource} with ID {id} not found")]
    NotFound { resource: String, id: String },

    /// Generic internal service error
    #[error("Failed to {operation}")]
    Internal { operation: String },

    /// Store operation error
    #[error(transparent)]
    Database(#[from] DbError),

    /// Unexpected error with full context chain
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Unauthenticated { .. } => StatusCode::UNAUTHORIZED,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::Internal { .. } | Error::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Database(db_err) => match db_err.kind() {
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::AlreadyExists => StatusCode::CONFLICT,
                ErrorKind::InvalidArgument => StatusCode::BAD_REQUEST,
                ErrorKind::FailedPrecondition => StatusCode::PRECONDITION_FAILED,
                ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// Returns a user-safe error message, without leaking internal implementation details
    pub fn user_message(&self) -> String {
        match self {
            Error::Unauthenticated { message } => message.clone().unwrap_or_else(|| "Authentication required".to_string()),
            Error::NotFound { resource, id } => format!("{resource} with ID {id} not found"),
            Error::Internal { .. } | Error::Other(_) => "Internal server error".to_string(),
            Error::Database(db_err) => match db_err {
                DbError::NotFound => "Resource not found".to_string(),
                DbError::UniqueViolation { constraint, .. } => match constraint.as_deref() {
                    Some("vehicles_license_plate_unique") => "A vehicle with this license plate already exists".to_string(),
                    Some("drivers_license_number_unique") => "A driver with this license number already exists".to_string(),
                    Some("drivers_user_id_unique") => "This user already has a driver record".to_string(),
                    Some("users_email_unique") => "An account with this email address already exists".to_string(),
                    Some("users_sso_id_unique") => "An account is already linked to this identity".to_string(),
                    Some("vehicle_types_name_unique") => "A vehicle type with this name already exists".to_string(),
                    _ => "Resource already exists".to_string(),
                },
                DbError::ForeignKeyViolation { .. } => "Referenced resource not found".to_string(),
                DbError::CheckViolation { .. } => "Invalid data provided".to_string(),
                DbError::InvalidArgument { .. } | DbError::InvalidTransition { .. } | DbError::FailedPrecondition { .. } => {
                    db_err.to_string()
                }
                DbError::Corrupt { .. } | DbError::Other(_) => "Database error occurred".to_string(),
            },
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        // Log full error details for debugging - different log levels based on severity
        match &self {
            Error::Database(DbError::Other(_) | DbError::Corrupt { .. }) | Error::Internal { .. } | Error::Other(_) => {
                tracing::error!("Internal service error: {:#}", self);
            }
            Error::Database(DbError::UniqueViolation { .. } | DbError::ForeignKeyViolation { .. } | DbError::CheckViolation { .. }) => {
                tracing::warn!("Database constraint error: {}", self);
            }
            Error::Unauthenticated { .. } => {
                tracing::info!("Authentication error: {}", self);
            }
            Error::Database(_) | Error::NotFound { .. } => {
                tracing::debug!("Client error: {}", self);
            }
        }

        (self.status_code(), self.user_message()).into_response()
    }
}

/// Type alias for service operation results
pub type Result<T> = std::result::Result<T, Error>;
