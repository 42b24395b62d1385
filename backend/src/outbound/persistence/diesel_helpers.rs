//! Shared helpers for Diesel repository implementations.
//!
//! Repositories classify driver failures once through [`classify`] and then
//! map the resulting [`DieselFailure`] into their own port error. Raw driver
//! text is logged at debug level and never copied into port errors.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// Extract a readable message from a pool error.
pub fn map_pool_error_message(error: PoolError) -> String {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    }
}

/// Coarse classification of a Diesel failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DieselFailure {
    /// A unique or primary-key constraint rejected the write.
    UniqueViolation { constraint: Option<String> },
    /// A foreign-key constraint rejected the write.
    ForeignKeyViolation { constraint: Option<String> },
    /// A check constraint rejected the write.
    CheckViolation { constraint: Option<String> },
    /// A single-row query matched nothing.
    NotFound,
    /// The connection was lost.
    Connection,
    /// Anything else; carries a sanitised description.
    Query(&'static str),
}

/// Classify `error` and log its detail under `operation`.
pub fn classify(error: DieselError, operation: &str) -> DieselFailure {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(
                ?kind,
                message = info.message(),
                constraint = info.constraint_name(),
                %operation,
                "diesel operation failed"
            );
        }
        _ => debug!(error = %error, %operation, "diesel operation failed"),
    }

    match error {
        DieselError::NotFound => DieselFailure::NotFound,
        DieselError::QueryBuilderError(_) => DieselFailure::Query("database query error"),
        DieselError::DeserializationError(_) => {
            DieselFailure::Query("database row could not be decoded")
        }
        DieselError::DatabaseError(kind, info) => {
            let constraint = info.constraint_name().map(str::to_owned);
            match kind {
                DatabaseErrorKind::UniqueViolation => DieselFailure::UniqueViolation { constraint },
                DatabaseErrorKind::ForeignKeyViolation => {
                    DieselFailure::ForeignKeyViolation { constraint }
                }
                DatabaseErrorKind::CheckViolation => DieselFailure::CheckViolation { constraint },
                DatabaseErrorKind::ClosedConnection => DieselFailure::Connection,
                _ => DieselFailure::Query("database error"),
            }
        }
        DieselError::BrokenTransactionManager => DieselFailure::Connection,
        _ => DieselFailure::Query("database error"),
    }
}

/// Collect row conversion results, mapping the first error through `map_err`.
pub fn collect_rows<T, E>(
    results: impl Iterator<Item = Result<T, String>>,
    map_err: impl FnOnce(String) -> E,
) -> Result<Vec<T>, E> {
    results.collect::<Result<Vec<_>, _>>().map_err(map_err)
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn not_found_is_preserved() {
        assert_eq!(
            classify(DieselError::NotFound, "test"),
            DieselFailure::NotFound
        );
    }

    #[rstest]
    fn rollback_requests_are_generic_query_failures() {
        assert_eq!(
            classify(DieselError::RollbackTransaction, "test"),
            DieselFailure::Query("database error")
        );
    }

    #[rstest]
    fn pool_messages_are_extracted() {
        assert_eq!(
            map_pool_error_message(PoolError::checkout("timed out")),
            "timed out"
        );
    }

    #[rstest]
    fn collect_rows_reports_first_failure() {
        let rows = vec![Ok(1), Err("bad".to_owned()), Err("worse".to_owned())];
        let result: Result<Vec<i32>, String> =
            collect_rows(rows.into_iter(), |msg| format!("mapped: {msg}"));
        assert_eq!(result, Err("mapped: bad".to_owned()));
    }
}
