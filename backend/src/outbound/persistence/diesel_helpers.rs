//! Shared helpers for Diesel repository implementations.
//!
//! Every repository maps pool and Diesel failures onto its own port error
//! through these functions, so the classification (connection, duplicate,
//! query) and the debug logging of raw database messages live in one place.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// Map pool errors into a repository-specific connection error constructor.
pub(crate) fn map_pool_error<E, C>(error: PoolError, connection: C) -> E
where
    C: FnOnce(String) -> E,
{
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    debug!(%message, "connection pool failure");
    connection(message)
}

/// Constructors a repository supplies to [`map_diesel_error`].
pub(crate) struct DieselErrorMapping<Q, C, D> {
    /// Builds the generic query failure.
    pub query: Q,
    /// Builds the retryable connection failure.
    pub connection: C,
    /// Builds the duplicate-key failure, when the repository has one.
    pub duplicate: Option<D>,
}

/// Map a Diesel error into a repository error.
///
/// The raw database message is logged at `debug` and never forwarded. Unique
/// violations use the duplicate constructor when present and fall back to a
/// query error otherwise.
pub(crate) fn map_diesel_error<E, Q, C, D>(
    error: DieselError,
    mapping: DieselErrorMapping<Q, C, D>,
) -> E
where
    Q: FnOnce(&'static str) -> E,
    C: FnOnce(&'static str) -> E,
    D: FnOnce() -> E,
{
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(
                ?kind,
                message = info.message(),
                constraint = info.constraint_name(),
                "diesel operation failed"
            );
        }
        other => debug!(error = %other, "diesel operation failed"),
    }

    let DieselErrorMapping {
        query,
        connection,
        duplicate,
    } = mapping;
    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _)
        | DieselError::BrokenTransactionManager => connection("database connection error"),
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => match duplicate {
            Some(duplicate) => duplicate(),
            None => query("database error"),
        },
        DieselError::NotFound => query("record not found"),
        DieselError::QueryBuilderError(_) => query("database query error"),
        _ => query("database error"),
    }
}

/// Constructor type for repositories without a duplicate variant.
pub(crate) type NoDuplicate<E> = fn() -> E;

/// Collect converted rows, mapping the first conversion failure.
pub(crate) fn collect_rows<T, E>(
    results: impl Iterator<Item = Result<T, String>>,
    map_err: impl FnOnce(String) -> E,
) -> Result<Vec<T>, E> {
    results.collect::<Result<Vec<_>, _>>().map_err(map_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::result::DatabaseErrorInformation;
    use rstest::rstest;

    #[derive(Debug, PartialEq, Eq)]
    enum Mapped {
        Query(&'static str),
        Connection(&'static str),
        Duplicate,
    }

    struct Info(&'static str);

    impl DatabaseErrorInformation for Info {
        fn message(&self) -> &str {
            self.0
        }
        fn details(&self) -> Option<&str> {
            None
        }
        fn hint(&self) -> Option<&str> {
            None
        }
        fn table_name(&self) -> Option<&str> {
            None
        }
        fn column_name(&self) -> Option<&str> {
            None
        }
        fn constraint_name(&self) -> Option<&str> {
            Some("referral_agencies_name_key")
        }
        fn statement_position(&self) -> Option<i32> {
            None
        }
    }

    fn database_error(kind: DatabaseErrorKind) -> DieselError {
        DieselError::DatabaseError(kind, Box::new(Info("duplicate key value violates")))
    }

    fn map(error: DieselError, with_duplicate: bool) -> Mapped {
        map_diesel_error(
            error,
            DieselErrorMapping {
                query: Mapped::Query,
                connection: Mapped::Connection,
                duplicate: with_duplicate.then_some(|| Mapped::Duplicate),
            },
        )
    }

    #[rstest]
    #[case(database_error(DatabaseErrorKind::UniqueViolation), true, Mapped::Duplicate)]
    #[case(
        database_error(DatabaseErrorKind::UniqueViolation),
        false,
        Mapped::Query("database error")
    )]
    #[case(
        database_error(DatabaseErrorKind::ClosedConnection),
        true,
        Mapped::Connection("database connection error")
    )]
    #[case(DieselError::BrokenTransactionManager, true, Mapped::Connection("database connection error"))]
    #[case(DieselError::NotFound, true, Mapped::Query("record not found"))]
    #[case(
        database_error(DatabaseErrorKind::CheckViolation),
        true,
        Mapped::Query("database error")
    )]
    fn diesel_errors_are_classified(
        #[case] error: DieselError,
        #[case] with_duplicate: bool,
        #[case] expected: Mapped,
    ) {
        assert_eq!(map(error, with_duplicate), expected);
    }

    #[rstest]
    fn raw_messages_are_not_forwarded() {
        let mapped = map(database_error(DatabaseErrorKind::ForeignKeyViolation), false);
        let Mapped::Query(message) = mapped else {
            panic!("expected query error");
        };
        assert!(!message.contains("violates"));
    }

    #[rstest]
    fn pool_errors_keep_their_message() {
        let message: String = map_pool_error(PoolError::checkout("timed out"), |m| m);
        assert_eq!(message, "timed out");
    }

    #[rstest]
    fn first_conversion_failure_wins() {
        let rows = vec![Ok(1), Err("bad".to_owned()), Err("worse".to_owned())];
        let err = collect_rows(rows.into_iter(), |message| message).expect_err("fails");
        assert_eq!(err, "bad");
    }
}
