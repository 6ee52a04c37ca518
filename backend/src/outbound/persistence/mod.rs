//! PostgreSQL persistence adapters built on Diesel.
//!
//! Each repository implements one driven port. Failures are classified as
//! connection or query errors; operations hitting a connection-classed
//! failure are retried exactly once before the error propagates.

mod diesel_contact_repository;
mod diesel_content_repository;
mod diesel_otp_repository;
mod diesel_user_repository;
mod models;
pub mod pool;
pub mod schema;

pub use diesel_contact_repository::DieselContactRepository;
pub use diesel_content_repository::DieselContentRepository;
pub use diesel_otp_repository::DieselOtpRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError};

use std::future::Future;

use tracing::{debug, warn};

/// Classification of a database failure, shared by the repositories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DbErrorClass {
    /// The connection was lost or could not be established.
    Connection(String),
    /// The statement itself failed.
    Query(String),
    /// A unique constraint rejected the row.
    UniqueViolation,
}

/// Classify a Diesel error without leaking backend detail to the domain.
pub(crate) fn classify_diesel_error(error: &diesel::result::Error) -> DbErrorClass {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
            match kind {
                DatabaseErrorKind::UniqueViolation => DbErrorClass::UniqueViolation,
                DatabaseErrorKind::ClosedConnection => {
                    DbErrorClass::Connection("database connection closed".to_owned())
                }
                _ => DbErrorClass::Query("database error".to_owned()),
            }
        }
        DieselError::BrokenTransactionManager => {
            DbErrorClass::Connection("transaction manager broken".to_owned())
        }
        other => {
            debug!(
                error_type = %std::any::type_name_of_val(other),
                "diesel operation failed"
            );
            DbErrorClass::Query("database error".to_owned())
        }
    }
}

/// Port errors that can tell a connection failure from a query failure.
pub(crate) trait ConnectionClassed {
    fn is_connection(&self) -> bool;
}

/// Run `op`, retrying it once if the first attempt fails with a
/// connection-classed error. Query failures propagate immediately: the
/// statement would fail again and mutations must not run twice.
pub(crate) async fn retry_once_on_connection<T, E, F, Fut>(op: F) -> Result<T, E>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: ConnectionClassed + std::fmt::Display,
{
    match op().await {
        Err(error) if error.is_connection() => {
            warn!(%error, "database connection failed, retrying once");
            op().await
        }
        other => other,
    }
}

impl ConnectionClassed for crate::domain::ports::UserRepositoryError {
    fn is_connection(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }
}

impl ConnectionClassed for crate::domain::ports::ContentRepositoryError {
    fn is_connection(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }
}

impl ConnectionClassed for crate::domain::ports::ContactRepositoryError {
    fn is_connection(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }
}

impl ConnectionClassed for crate::domain::ports::OtpRepositoryError {
    fn is_connection(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::UserRepositoryError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn connection_failure_is_retried_once() {
        let attempts = AtomicUsize::new(0);
        let result: Result<u32, UserRepositoryError> = retry_once_on_connection(|| {
            let attempt = attempts.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt == 0 {
                    Err(UserRepositoryError::connection("refused"))
                } else {
                    Ok(7)
                }
            }
        })
        .await;

        assert_eq!(result, Ok(7));
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn second_connection_failure_propagates() {
        let attempts = AtomicUsize::new(0);
        let result: Result<u32, UserRepositoryError> = retry_once_on_connection(|| {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err(UserRepositoryError::connection("still refused")) }
        })
        .await;

        assert_eq!(result, Err(UserRepositoryError::connection("still refused")));
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn query_failure_is_not_retried() {
        let attempts = AtomicUsize::new(0);
        let result: Result<u32, UserRepositoryError> = retry_once_on_connection(|| {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err(UserRepositoryError::query("syntax error")) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unique_violation_is_classified() {
        let error = diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::UniqueViolation,
            Box::new("duplicate key".to_owned()),
        );
        assert_eq!(classify_diesel_error(&error), DbErrorClass::UniqueViolation);
    }

    #[test]
    fn closed_connection_is_classified() {
        let error = diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::ClosedConnection,
            Box::new("terminated".to_owned()),
        );
        assert!(matches!(
            classify_diesel_error(&error),
            DbErrorClass::Connection(_)
        ));
    }

    #[test]
    fn not_found_is_a_query_error() {
        assert!(matches!(
            classify_diesel_error(&diesel::result::Error::NotFound),
            DbErrorClass::Query(_)
        ));
    }
}
