//! Shared Diesel error classification for the persistence adapters.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

/// Broad classification the adapters map onto their port error enums.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DbFailure {
    /// No row matched.
    NotFound,
    /// A unique constraint was violated.
    UniqueViolation,
    /// The connection dropped mid-operation.
    Connection,
    /// Anything else.
    Other,
}

/// Classify a Diesel error, logging the raw failure at debug level.
pub(crate) fn classify(error: &DieselError) -> DbFailure {
    match error {
        DieselError::NotFound => DbFailure::NotFound,
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
            match kind {
                DatabaseErrorKind::UniqueViolation => DbFailure::UniqueViolation,
                DatabaseErrorKind::ClosedConnection => DbFailure::Connection,
                _ => DbFailure::Other,
            }
        }
        other => {
            debug!(
                error_type = %std::any::type_name_of_val(other),
                "diesel operation failed"
            );
            DbFailure::Other
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn not_found_classifies_as_not_found() {
        assert_eq!(classify(&DieselError::NotFound), DbFailure::NotFound);
    }

    #[rstest]
    fn unique_violations_are_recognised() {
        let error = DieselError::DatabaseError(
            DatabaseErrorKind::UniqueViolation,
            Box::new("duplicate key value".to_owned()),
        );
        assert_eq!(classify(&error), DbFailure::UniqueViolation);
    }

    #[rstest]
    fn closed_connections_classify_as_connection() {
        let error = DieselError::DatabaseError(
            DatabaseErrorKind::ClosedConnection,
            Box::new("server closed the connection".to_owned()),
        );
        assert_eq!(classify(&error), DbFailure::Connection);
    }
}
