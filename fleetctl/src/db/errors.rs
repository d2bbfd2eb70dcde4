use thiserror::Error;

/// Unified error type for store operations. Every `sqlx::Error` is classified into one of these
/// variants before it leaves the `db` module.
#[derive(Error, Debug)]
pub enum DbError {
    /// Entity not found by the given identifier
    #[error("Entity not found")]
    NotFound,

    /// Unique constraint violation
    #[error("Unique constraint violation")]
    UniqueViolation {
        constraint: Option<String>,
        table: Option<String>,
        message: String,
    },

    /// Foreign key constraint violation
    #[error("Foreign key constraint violation")]
    ForeignKeyViolation {
        constraint: Option<String>,
        table: Option<String>,
        message: String,
    },

    /// Check constraint violation
    #[error("Check constraint violation")]
    CheckViolation {
        constraint: Option<String>,
        table: Option<String>,
        message: String,
    },

    /// Malformed filter, field mask, page token or argument
    #[error("{message}")]
    InvalidArgument { message: String },

    /// Status change not present in the entity's transition table
    #[error("invalid status transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    /// A business rule layered above the transition table rejected the operation
    #[error("{message}")]
    FailedPrecondition { message: String },

    /// Stored data that cannot be decoded into its domain type
    #[error("corrupt record: {message}")]
    Corrupt { message: String },

    /// Catch-all for non-recoverable errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Coarse error classes exposed to callers of the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    AlreadyExists,
    InvalidArgument,
    FailedPrecondition,
    Internal,
}

impl DbError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            // a dangling reference means the owning record is absent
            DbError::NotFound | DbError::ForeignKeyViolation { .. } => ErrorKind::NotFound,
            DbError::UniqueViolation { .. } => ErrorKind::AlreadyExists,
            DbError::InvalidArgument { .. } | DbError::InvalidTransition { .. } | DbError::CheckViolation { .. } => {
                ErrorKind::InvalidArgument
            }
            DbError::FailedPrecondition { .. } => ErrorKind::FailedPrecondition,
            DbError::Corrupt { .. } | DbError::Other(_) => ErrorKind::Internal,
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        DbError::InvalidArgument { message: message.into() }
    }

    pub fn failed_precondition(message: impl Into<String>) -> Self {
        DbError::FailedPrecondition { message: message.into() }
    }

    pub fn corrupt(message: impl Into<String>) -> Self {
        DbError::Corrupt { message: message.into() }
    }

    /// Duplicate detected by a read before the write; shaped like the constraint violation the
    /// write itself would have raised.
    pub fn already_exists(table: &str, constraint: &str, message: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            constraint: Some(constraint.to_string()),
            table: Some(table.to_string()),
            message: message.into(),
        }
    }
}

/// Convert from sqlx::Error using proper sqlx error categorization
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => DbError::NotFound,
            sqlx::Error::Database(db_err) => {
                let constraint = db_err.constraint().map(|s| s.to_string());
                let table = db_err.table().map(|s| s.to_string());
                let message = db_err.message().to_string();

                if db_err.is_unique_violation() {
                    DbError::UniqueViolation { constraint, table, message }
                } else if db_err.is_foreign_key_violation() {
                    DbError::ForeignKeyViolation { constraint, table, message }
                } else if db_err.is_check_violation() {
                    DbError::CheckViolation { constraint, table, message }
                } else {
                    // All other database errors are non-recoverable - convert to anyhow
                    DbError::Other(anyhow::Error::from(err))
                }
            }
            // All other sqlx errors are non-recoverable - convert to anyhow with context
            _ => DbError::Other(anyhow::Error::from(err)),
        }
    }
}

/// Type alias for database operation results
pub type Result<T> = std::result::Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err = DbError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, DbError::NotFound));
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_kinds() {
        let unique = DbError::UniqueViolation {
            constraint: Some("drivers_license_number_unique".to_string()),
            table: Some("drivers".to_string()),
            message: "duplicate key".to_string(),
        };
        assert_eq!(unique.kind(), ErrorKind::AlreadyExists);

        let transition = DbError::InvalidTransition {
            from: "RETIRED".to_string(),
            to: "ACTIVE".to_string(),
        };
        assert_eq!(transition.kind(), ErrorKind::InvalidArgument);
        assert_eq!(transition.to_string(), "invalid status transition from RETIRED to ACTIVE");

        assert_eq!(DbError::failed_precondition("assigned").kind(), ErrorKind::FailedPrecondition);
        assert_eq!(DbError::corrupt("bad status").kind(), ErrorKind::Internal);
        assert_eq!(DbError::Other(anyhow::anyhow!("boom")).kind(), ErrorKind::Internal);
    }

    #[test]
    fn test_pool_errors_are_internal() {
        let err = DbError::from(sqlx::Error::PoolTimedOut);
        assert_eq!(err.kind(), ErrorKind::Internal);
    }
}
