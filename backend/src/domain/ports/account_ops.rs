//! Driving ports for authentication and OTP-gated account mutations.

use async_trait::async_trait;

use crate::domain::Error;
use crate::domain::user::{EmailAddress, User, UserId};

/// Credential check establishing a session.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Authenticate by email and password.
    ///
    /// Unknown addresses and wrong passwords both fail with the same
    /// `Unauthorized` error so the endpoint does not leak which emails
    /// are registered.
    async fn login(&self, email: &EmailAddress, password: &str) -> Result<User, Error>;
}

/// Read side of account management.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountQuery: Send + Sync {
    /// Fetch the caller's own record.
    async fn profile(&self, user_id: &UserId) -> Result<User, Error>;

    /// List all accounts (admin dashboard).
    async fn list_users(&self) -> Result<Vec<User>, Error>;
}

/// Write side of account management. Every mutation is OTP-gated: a
/// `request_*` call issues and emails a code, the matching `confirm_*`
/// call verifies it and commits.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountCommand: Send + Sync {
    /// Issue an OTP for changing the caller's email to `new_email`.
    /// The code is sent to the current address.
    async fn request_email_change(
        &self,
        user_id: &UserId,
        new_email: EmailAddress,
    ) -> Result<(), Error>;

    /// Verify the code and commit the pending email change.
    async fn confirm_email_change(&self, user_id: &UserId, code: &str) -> Result<User, Error>;

    /// Issue an OTP for changing the caller's password.
    async fn request_password_change(&self, user_id: &UserId) -> Result<(), Error>;

    /// Verify the code and set the new password.
    async fn confirm_password_change(
        &self,
        user_id: &UserId,
        code: &str,
        new_password: &str,
    ) -> Result<(), Error>;

    /// Issue an OTP (sent to the acting admin) for deleting `target`.
    async fn request_user_deletion(
        &self,
        admin_id: &UserId,
        target: &UserId,
    ) -> Result<(), Error>;

    /// Verify the code and delete `target`.
    async fn confirm_user_deletion(
        &self,
        admin_id: &UserId,
        target: &UserId,
        code: &str,
    ) -> Result<(), Error>;
}
