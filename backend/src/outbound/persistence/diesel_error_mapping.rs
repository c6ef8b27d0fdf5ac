//! Shared Diesel error classification.
//!
//! Repositories translate a [`DbFailure`] into their own port error so that
//! constraint names never leak past the adapter.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// Storage failure reduced to the cases repositories distinguish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DbFailure {
    /// Pool checkout failed or the server dropped the connection.
    Connection(String),
    UniqueViolation { constraint: Option<String> },
    ForeignKeyViolation { constraint: Option<String> },
    CheckViolation { constraint: Option<String> },
    Query(String),
}

impl DbFailure {
    /// Message suitable for a `Connection`/`Query` port error.
    pub(crate) fn message(&self) -> String {
        match self {
            Self::Connection(message) | Self::Query(message) => message.clone(),
            Self::UniqueViolation { constraint } => {
                format!("unique violation on {}", constraint_label(constraint))
            }
            Self::ForeignKeyViolation { constraint } => {
                format!("foreign key violation on {}", constraint_label(constraint))
            }
            Self::CheckViolation { constraint } => {
                format!("check violation on {}", constraint_label(constraint))
            }
        }
    }
}

fn constraint_label(constraint: &Option<String>) -> &str {
    constraint.as_deref().unwrap_or("unnamed constraint")
}

impl From<PoolError> for DbFailure {
    fn from(error: PoolError) -> Self {
        Self::Connection(error.message().to_owned())
    }
}

impl From<DieselError> for DbFailure {
    fn from(error: DieselError) -> Self {
        match &error {
            DieselError::DatabaseError(kind, info) => {
                debug!(?kind, message = info.message(), "diesel operation failed");
            }
            _ => debug!(
                error_type = %std::any::type_name_of_val(&error),
                "diesel operation failed"
            ),
        }

        match error {
            DieselError::DatabaseError(kind, info) => {
                let constraint = info.constraint_name().map(str::to_owned);
                match kind {
                    DatabaseErrorKind::UniqueViolation => Self::UniqueViolation { constraint },
                    DatabaseErrorKind::ForeignKeyViolation => {
                        Self::ForeignKeyViolation { constraint }
                    }
                    DatabaseErrorKind::CheckViolation => Self::CheckViolation { constraint },
                    DatabaseErrorKind::ClosedConnection => {
                        Self::Connection("database connection closed".to_owned())
                    }
                    _ => Self::Query("database error".to_owned()),
                }
            }
            DieselError::NotFound => Self::Query("record not found".to_owned()),
            DieselError::QueryBuilderError(_) => Self::Query("database query error".to_owned()),
            DieselError::DeserializationError(_) | DieselError::SerializationError(_) => {
                Self::Query("row conversion error".to_owned())
            }
            _ => Self::Query("database error".to_owned()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_errors_are_connection_failures() {
        let failure = DbFailure::from(PoolError::checkout("timed out"));
        assert_eq!(failure, DbFailure::Connection("timed out".to_owned()));
    }

    #[test]
    fn not_found_is_a_query_failure() {
        let failure = DbFailure::from(DieselError::NotFound);
        assert_eq!(failure.message(), "record not found");
    }

    #[test]
    fn constraint_violations_name_the_constraint() {
        let failure = DbFailure::UniqueViolation {
            constraint: Some("users_email_key".to_owned()),
        };
        assert_eq!(failure.message(), "unique violation on users_email_key");
        let failure = DbFailure::CheckViolation { constraint: None };
        assert_eq!(failure.message(), "check violation on unnamed constraint");
    }
}
