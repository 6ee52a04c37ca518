//! Port for user account persistence.

use async_trait::async_trait;

use crate::domain::user::{EmailAddress, PasswordHash, User, UserId};

/// Errors raised by user repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserRepositoryError {
    /// Repository connection could not be established.
    #[error("user repository connection failed: {message}")]
    Connection { message: String },

    /// Query or mutation failed during execution.
    #[error("user repository query failed: {message}")]
    Query { message: String },

    /// The email address is already registered to another account.
    #[error("email address is already registered")]
    DuplicateEmail,
}

impl UserRepositoryError {
    /// Create a connection error with the given message.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a query error with the given message.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Port for user account storage and retrieval.
///
/// Email lookups are exact matches against the normalised (lowercased)
/// address. Mutations return whether a row was affected so callers can map
/// misses to `NotFound`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fetch a user by id.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError>;

    /// Fetch a user by email address.
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserRepositoryError>;

    /// List all users ordered by creation time.
    async fn list(&self) -> Result<Vec<User>, UserRepositoryError>;

    /// Insert a new user.
    ///
    /// Fails with [`UserRepositoryError::DuplicateEmail`] when the email is
    /// already registered.
    async fn insert(&self, user: &User) -> Result<(), UserRepositoryError>;

    /// Replace a user's email address. Returns `false` when no row matched.
    async fn update_email(
        &self,
        id: &UserId,
        email: &EmailAddress,
    ) -> Result<bool, UserRepositoryError>;

    /// Replace a user's password hash. Returns `false` when no row matched.
    async fn update_password(
        &self,
        id: &UserId,
        password_hash: &PasswordHash,
    ) -> Result<bool, UserRepositoryError>;

    /// Delete a user. Returns `false` when no row matched.
    async fn delete(&self, id: &UserId) -> Result<bool, UserRepositoryError>;
}
