//! Account domain service: login, profile reads, and OTP-gated mutations.
//!
//! Every sensitive mutation runs as a request/confirm pair. The request
//! step issues a single-use code, stores it, and emails it to the account
//! holder; the confirm step verifies the code, consumes the challenge, and
//! commits the pending change.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;

use crate::domain::Error;
use crate::domain::notifications::otp_email;
use crate::domain::otp::{OtpChallenge, OtpCode, OtpPurpose};
use crate::domain::ports::{
    AccountCommand, AccountQuery, LoginService, Mailer, OtpRepository, OtpRepositoryError,
    UserRepository, UserRepositoryError,
};
use crate::domain::user::{EmailAddress, PasswordHash, User, UserId};

/// Account service implementing login, queries, and OTP-gated commands.
#[derive(Clone)]
pub struct AccountService<U, O> {
    users: Arc<U>,
    otps: Arc<O>,
    mailer: Arc<dyn Mailer>,
    clock: Arc<dyn Clock>,
    otp_ttl: chrono::Duration,
}

impl<U, O> AccountService<U, O> {
    /// Create a new service issuing codes valid for `otp_ttl`.
    pub fn new(
        users: Arc<U>,
        otps: Arc<O>,
        mailer: Arc<dyn Mailer>,
        clock: Arc<dyn Clock>,
        otp_ttl: chrono::Duration,
    ) -> Self {
        Self {
            users,
            otps,
            mailer,
            clock,
            otp_ttl,
        }
    }
}

fn map_user_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserRepositoryError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserRepositoryError::DuplicateEmail => {
            Error::conflict("email address is already registered")
        }
    }
}

fn map_otp_error(error: OtpRepositoryError) -> Error {
    match error {
        OtpRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("otp repository unavailable: {message}"))
        }
        OtpRepositoryError::Query { message } => {
            Error::internal(format!("otp repository error: {message}"))
        }
    }
}

/// Uniform rejection for any OTP failure. The category is machine-readable
/// in `details`; the message stays generic.
fn otp_rejected(reason: &'static str) -> Error {
    Error::unauthorized("verification code rejected").with_details(json!({ "reason": reason }))
}

impl<U, O> AccountService<U, O>
where
    U: UserRepository,
    O: OtpRepository,
{
    async fn load_user(&self, id: &UserId) -> Result<User, Error> {
        self.users
            .find_by_id(id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found("user not found"))
    }

    async fn load_admin(&self, id: &UserId) -> Result<User, Error> {
        let user = self.load_user(id).await?;
        if !user.is_admin {
            return Err(Error::forbidden("administrator role required"));
        }
        Ok(user)
    }

    /// Issue a challenge, store it (superseding any live predecessor), and
    /// email the code. Delivery failure aborts the request: a code the
    /// account holder never received gates nothing.
    async fn issue_challenge(
        &self,
        user_id: UserId,
        purpose: OtpPurpose,
        payload: Option<String>,
        recipient: &EmailAddress,
    ) -> Result<(), Error> {
        let now = self.clock.utc();
        let challenge = OtpChallenge::issue(
            &mut rand::thread_rng(),
            user_id,
            purpose,
            payload,
            self.otp_ttl,
            now,
        );
        self.otps.store(&challenge).await.map_err(map_otp_error)?;

        let email = otp_email(recipient, &challenge, self.otp_ttl.num_minutes());
        self.mailer.send(&email).await.map_err(|error| {
            Error::service_unavailable(format!("verification email could not be sent: {error}"))
        })
    }

    /// Verify a submitted code and consume the challenge, returning it so
    /// callers can read the pending payload.
    async fn consume_challenge(
        &self,
        user_id: &UserId,
        purpose: OtpPurpose,
        code: &str,
    ) -> Result<OtpChallenge, Error> {
        let submitted = OtpCode::parse(code).ok_or_else(|| otp_rejected("otp_mismatch"))?;

        let challenge = self
            .otps
            .find_latest(user_id, purpose)
            .await
            .map_err(map_otp_error)?
            .ok_or_else(|| otp_rejected("otp_missing"))?;

        challenge
            .verify(&submitted, self.clock.utc())
            .map_err(|error| otp_rejected(error.detail_code()))?;

        let consumed = self
            .otps
            .mark_consumed(challenge.id)
            .await
            .map_err(map_otp_error)?;
        if !consumed {
            // Superseded between lookup and consumption.
            return Err(otp_rejected("otp_missing"));
        }
        Ok(challenge)
    }
}

#[async_trait]
impl<U, O> LoginService for AccountService<U, O>
where
    U: UserRepository,
    O: OtpRepository,
{
    async fn login(&self, email: &EmailAddress, password: &str) -> Result<User, Error> {
        let user = self
            .users
            .find_by_email(email)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::unauthorized("invalid credentials"))?;

        if !user.password_hash.verify(password) {
            return Err(Error::unauthorized("invalid credentials"));
        }
        Ok(user)
    }
}

#[async_trait]
impl<U, O> AccountQuery for AccountService<U, O>
where
    U: UserRepository,
    O: OtpRepository,
{
    async fn profile(&self, user_id: &UserId) -> Result<User, Error> {
        self.load_user(user_id).await
    }

    async fn list_users(&self) -> Result<Vec<User>, Error> {
        self.users.list().await.map_err(map_user_error)
    }
}

#[async_trait]
impl<U, O> AccountCommand for AccountService<U, O>
where
    U: UserRepository,
    O: OtpRepository,
{
    async fn request_email_change(
        &self,
        user_id: &UserId,
        new_email: EmailAddress,
    ) -> Result<(), Error> {
        let user = self.load_user(user_id).await?;
        if user.email == new_email {
            return Err(Error::invalid_request(
                "new email matches the current address",
            ));
        }
        // Early duplicate check; the unique constraint still backstops the
        // race at confirmation time.
        let taken = self
            .users
            .find_by_email(&new_email)
            .await
            .map_err(map_user_error)?;
        if taken.is_some() {
            return Err(Error::conflict("email address is already registered"));
        }

        // The code goes to the current address so a hijacked session alone
        // cannot redirect the account.
        self.issue_challenge(
            user.id,
            OtpPurpose::EmailChange,
            Some(new_email.as_ref().to_owned()),
            &user.email,
        )
        .await
    }

    async fn confirm_email_change(&self, user_id: &UserId, code: &str) -> Result<User, Error> {
        let challenge = self
            .consume_challenge(user_id, OtpPurpose::EmailChange, code)
            .await?;

        let pending = challenge
            .payload
            .as_deref()
            .ok_or_else(|| Error::internal("email change challenge has no pending address"))?;
        let new_email = EmailAddress::new(pending)
            .map_err(|error| Error::internal(format!("stored pending address invalid: {error}")))?;

        let updated = self
            .users
            .update_email(user_id, &new_email)
            .await
            .map_err(map_user_error)?;
        if !updated {
            return Err(Error::not_found("user not found"));
        }
        self.load_user(user_id).await
    }

    async fn request_password_change(&self, user_id: &UserId) -> Result<(), Error> {
        let user = self.load_user(user_id).await?;
        self.issue_challenge(user.id, OtpPurpose::PasswordChange, None, &user.email)
            .await
    }

    async fn confirm_password_change(
        &self,
        user_id: &UserId,
        code: &str,
        new_password: &str,
    ) -> Result<(), Error> {
        // Reject a weak password before the challenge is consumed so the
        // caller can retry with the same code.
        let password_hash =
            PasswordHash::derive(new_password).map_err(|error| Error::invalid_request(error.to_string()))?;

        self.consume_challenge(user_id, OtpPurpose::PasswordChange, code)
            .await?;

        let updated = self
            .users
            .update_password(user_id, &password_hash)
            .await
            .map_err(map_user_error)?;
        if !updated {
            return Err(Error::not_found("user not found"));
        }
        Ok(())
    }

    async fn request_user_deletion(
        &self,
        admin_id: &UserId,
        target: &UserId,
    ) -> Result<(), Error> {
        let admin = self.load_admin(admin_id).await?;
        if admin_id == target {
            return Err(Error::invalid_request("cannot delete your own account"));
        }
        if self
            .users
            .find_by_id(target)
            .await
            .map_err(map_user_error)?
            .is_none()
        {
            return Err(Error::not_found("user not found"));
        }

        self.issue_challenge(
            admin.id,
            OtpPurpose::AccountDeletion,
            Some(target.to_string()),
            &admin.email,
        )
        .await
    }

    async fn confirm_user_deletion(
        &self,
        admin_id: &UserId,
        target: &UserId,
        code: &str,
    ) -> Result<(), Error> {
        let _admin = self.load_admin(admin_id).await?;
        if admin_id == target {
            return Err(Error::invalid_request("cannot delete your own account"));
        }

        let challenge = self
            .consume_challenge(admin_id, OtpPurpose::AccountDeletion, code)
            .await?;
        if challenge.payload.as_deref() != Some(target.to_string().as_str()) {
            return Err(otp_rejected("otp_target_mismatch"));
        }

        let deleted = self.users.delete(target).await.map_err(map_user_error)?;
        if !deleted {
            return Err(Error::not_found("user not found"));
        }
        Ok(())
    }
}
