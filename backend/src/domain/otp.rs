//! One-time passwords gating sensitive account mutations.
//!
//! A challenge is issued for a user and purpose, emailed to the account
//! holder, and must be returned before the mutation commits. Challenges are
//! single-use and expire after a configurable window.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::UserId;

/// Number of digits in an OTP code.
pub const OTP_DIGITS: usize = 6;

/// Six-digit numeric one-time code.
#[derive(Clone, PartialEq, Eq)]
pub struct OtpCode(String);

impl OtpCode {
    /// Generate a fresh uniformly random code.
    pub fn generate<R: Rng>(rng: &mut R) -> Self {
        let value: u32 = rng.gen_range(0..1_000_000);
        Self(format!("{value:06}"))
    }

    /// Reconstruct a code from its stored representation.
    ///
    /// Returns `None` unless the input is exactly six ASCII digits.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.len() == OTP_DIGITS && raw.bytes().all(|b| b.is_ascii_digit()) {
            Some(Self(raw.to_owned()))
        } else {
            None
        }
    }

    /// Stored representation.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

// Codes are secrets; keep them out of logs.
impl fmt::Debug for OtpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OtpCode(..)")
    }
}

/// The account mutation a challenge protects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OtpPurpose {
    EmailChange,
    PasswordChange,
    AccountDeletion,
}

impl OtpPurpose {
    /// Stable string used in the database.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EmailChange => "email_change",
            Self::PasswordChange => "password_change",
            Self::AccountDeletion => "account_deletion",
        }
    }

    /// Parse the stable string form.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "email_change" => Some(Self::EmailChange),
            "password_change" => Some(Self::PasswordChange),
            "account_deletion" => Some(Self::AccountDeletion),
            _ => None,
        }
    }
}

impl fmt::Display for OtpPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a submitted code failed to verify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum OtpVerifyError {
    #[error("code has already been used")]
    Consumed,
    #[error("code has expired")]
    Expired,
    #[error("code does not match")]
    Mismatch,
}

impl OtpVerifyError {
    /// Machine-readable detail code surfaced in error payloads.
    pub fn detail_code(self) -> &'static str {
        match self {
            Self::Consumed => "otp_consumed",
            Self::Expired => "otp_expired",
            Self::Mismatch => "otp_mismatch",
        }
    }
}

/// Stored OTP challenge.
///
/// `payload` carries the pending mutation value where one exists: the new
/// email address for [`OtpPurpose::EmailChange`], the target user id for
/// [`OtpPurpose::AccountDeletion`], nothing for password changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpChallenge {
    pub id: Uuid,
    pub user_id: UserId,
    pub purpose: OtpPurpose,
    pub code: OtpCode,
    pub payload: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub consumed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl OtpChallenge {
    /// Issue a fresh challenge expiring `ttl` from `now`.
    pub fn issue<R: Rng>(
        rng: &mut R,
        user_id: UserId,
        purpose: OtpPurpose,
        payload: Option<String>,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            purpose,
            code: OtpCode::generate(rng),
            payload,
            expires_at: now + ttl,
            consumed_at: None,
            created_at: now,
        }
    }

    /// Check a submitted code against this challenge.
    ///
    /// Rejection order: consumed, then expired, then mismatched. A consumed
    /// challenge never verifies again regardless of the code submitted.
    pub fn verify(&self, submitted: &OtpCode, now: DateTime<Utc>) -> Result<(), OtpVerifyError> {
        if self.consumed_at.is_some() {
            return Err(OtpVerifyError::Consumed);
        }
        if now >= self.expires_at {
            return Err(OtpVerifyError::Expired);
        }
        if &self.code != submitted {
            return Err(OtpVerifyError::Mismatch);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use rstest::rstest;

    fn challenge(now: DateTime<Utc>) -> OtpChallenge {
        let mut rng = SmallRng::seed_from_u64(7);
        OtpChallenge::issue(
            &mut rng,
            UserId::random(),
            OtpPurpose::EmailChange,
            Some("new@example.com".to_owned()),
            Duration::minutes(10),
            now,
        )
    }

    #[test]
    fn generated_codes_are_six_digits() {
        let mut rng = SmallRng::seed_from_u64(42);
        for _ in 0..100 {
            let code = OtpCode::generate(&mut rng);
            assert_eq!(code.as_str().len(), OTP_DIGITS);
            assert!(code.as_str().bytes().all(|b| b.is_ascii_digit()));
        }
    }

    #[rstest]
    #[case("123456", true)]
    #[case("000000", true)]
    #[case("12345", false)]
    #[case("1234567", false)]
    #[case("12345a", false)]
    #[case("", false)]
    fn parse_enforces_shape(#[case] raw: &str, #[case] ok: bool) {
        assert_eq!(OtpCode::parse(raw).is_some(), ok);
    }

    #[rstest]
    #[case(OtpPurpose::EmailChange, "email_change")]
    #[case(OtpPurpose::PasswordChange, "password_change")]
    #[case(OtpPurpose::AccountDeletion, "account_deletion")]
    fn purpose_strings_round_trip(#[case] purpose: OtpPurpose, #[case] raw: &str) {
        assert_eq!(purpose.as_str(), raw);
        assert_eq!(OtpPurpose::parse(raw), Some(purpose));
    }

    #[test]
    fn matching_code_verifies_before_expiry() {
        let now = Utc::now();
        let challenge = challenge(now);
        let submitted = OtpCode::parse(challenge.code.as_str()).expect("valid code");
        challenge
            .verify(&submitted, now + Duration::minutes(5))
            .expect("code should verify");
    }

    #[test]
    fn expired_code_is_rejected() {
        let now = Utc::now();
        let challenge = challenge(now);
        let submitted = OtpCode::parse(challenge.code.as_str()).expect("valid code");
        let result = challenge.verify(&submitted, now + Duration::minutes(11));
        assert_eq!(result, Err(OtpVerifyError::Expired));
    }

    #[test]
    fn expiry_boundary_is_exclusive() {
        let now = Utc::now();
        let challenge = challenge(now);
        let submitted = OtpCode::parse(challenge.code.as_str()).expect("valid code");
        let result = challenge.verify(&submitted, challenge.expires_at);
        assert_eq!(result, Err(OtpVerifyError::Expired));
    }

    #[test]
    fn mismatched_code_is_rejected() {
        let now = Utc::now();
        let challenge = challenge(now);
        let wrong = if challenge.code.as_str() == "000000" {
            OtpCode::parse("000001").expect("valid code")
        } else {
            OtpCode::parse("000000").expect("valid code")
        };
        assert_eq!(challenge.verify(&wrong, now), Err(OtpVerifyError::Mismatch));
    }

    #[test]
    fn consumed_challenge_never_verifies() {
        let now = Utc::now();
        let mut challenge = challenge(now);
        challenge.consumed_at = Some(now);
        let submitted = OtpCode::parse(challenge.code.as_str()).expect("valid code");
        assert_eq!(
            challenge.verify(&submitted, now),
            Err(OtpVerifyError::Consumed)
        );
    }
}
