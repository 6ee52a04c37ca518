//! Port for OTP challenge persistence.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::otp::{OtpChallenge, OtpPurpose};
use crate::domain::user::UserId;

/// Errors raised by OTP repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OtpRepositoryError {
    /// Repository connection could not be established.
    #[error("otp repository connection failed: {message}")]
    Connection { message: String },

    /// Query or mutation failed during execution.
    #[error("otp repository query failed: {message}")]
    Query { message: String },
}

impl OtpRepositoryError {
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

/// Port for OTP challenge storage.
///
/// At most one live challenge exists per user and purpose: storing a new
/// challenge supersedes (removes) any unconsumed predecessor.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OtpRepository: Send + Sync {
    /// Store a challenge, superseding unconsumed challenges for the same
    /// user and purpose.
    async fn store(&self, challenge: &OtpChallenge) -> Result<(), OtpRepositoryError>;

    /// Fetch the newest unconsumed challenge for a user and purpose.
    async fn find_latest(
        &self,
        user_id: &UserId,
        purpose: OtpPurpose,
    ) -> Result<Option<OtpChallenge>, OtpRepositoryError>;

    /// Mark a challenge consumed. Returns `false` when no row matched.
    async fn mark_consumed(&self, id: Uuid) -> Result<bool, OtpRepositoryError>;
}
