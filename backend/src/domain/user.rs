//! User accounts and credential primitives.

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use rand::RngCore;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use utoipa::ToSchema;
use uuid::Uuid;

/// Validation errors for user-related value types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    #[error("user id must be a valid UUID")]
    InvalidId,
    #[error("email address is not valid")]
    InvalidEmail,
    #[error("email address must be at most {max} characters")]
    EmailTooLong { max: usize },
    #[error("display name must not be empty")]
    EmptyDisplayName,
    #[error("display name must be at most {max} characters")]
    DisplayNameTooLong { max: usize },
    #[error("password must be at least {min} characters")]
    PasswordTooShort { min: usize },
}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Validate and construct a [`UserId`] from string input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        Uuid::parse_str(id.as_ref())
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }

    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an already-parsed UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Maximum length accepted for an email address (RFC 5321 limit).
pub const EMAIL_MAX: usize = 254;

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        // Deliberately loose: one @, non-empty local part, dotted domain,
        // no whitespace. Deliverability is the mailer's problem.
        let pattern = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";
        Regex::new(pattern)
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Validated email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, example = "ada@example.com")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and construct an [`EmailAddress`].
    ///
    /// Input is trimmed and lowercased so lookups are case-insensitive.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let candidate = raw.as_ref().trim().to_lowercase();
        if candidate.chars().count() > EMAIL_MAX {
            return Err(UserValidationError::EmailTooLong { max: EMAIL_MAX });
        }
        if !email_regex().is_match(&candidate) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(candidate))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Maximum length accepted for a display name.
pub const DISPLAY_NAME_MAX: usize = 64;

/// Human readable name shown in the admin dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, example = "Ada Lovelace")]
pub struct DisplayName(String);

impl DisplayName {
    /// Validate and construct a [`DisplayName`].
    pub fn new(raw: impl Into<String>) -> Result<Self, UserValidationError> {
        let candidate = raw.into();
        if candidate.trim().is_empty() {
            return Err(UserValidationError::EmptyDisplayName);
        }
        if candidate.chars().count() > DISPLAY_NAME_MAX {
            return Err(UserValidationError::DisplayNameTooLong {
                max: DISPLAY_NAME_MAX,
            });
        }
        Ok(Self(candidate))
    }
}

impl AsRef<str> for DisplayName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<DisplayName> for String {
    fn from(value: DisplayName) -> Self {
        value.0
    }
}

impl TryFrom<String> for DisplayName {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Minimum length accepted for a new password.
pub const PASSWORD_MIN: usize = 8;

const SALT_BYTES: usize = 16;

/// Salted SHA-256 password digest, stored as `hex(salt)$hex(digest)`.
///
/// Never serialised into API responses; the Debug impl redacts the value.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Hash a plaintext password with a fresh random salt.
    pub fn derive(password: &str) -> Result<Self, UserValidationError> {
        if password.chars().count() < PASSWORD_MIN {
            return Err(UserValidationError::PasswordTooShort { min: PASSWORD_MIN });
        }
        let mut salt = [0u8; SALT_BYTES];
        rand::thread_rng().fill_bytes(&mut salt);
        Ok(Self::derive_with_salt(password, &salt))
    }

    fn derive_with_salt(password: &str, salt: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(salt);
        hasher.update(password.as_bytes());
        let digest = hasher.finalize();
        Self(format!("{}${}", hex::encode(salt), hex::encode(digest)))
    }

    /// Reconstruct a hash from its stored representation.
    pub fn from_stored(stored: impl Into<String>) -> Self {
        Self(stored.into())
    }

    /// Check a plaintext password against this hash.
    ///
    /// Malformed stored values never verify.
    pub fn verify(&self, password: &str) -> bool {
        let Some((salt_hex, _)) = self.0.split_once('$') else {
            return false;
        };
        let Ok(salt) = hex::decode(salt_hex) else {
            return false;
        };
        Self::derive_with_salt(password, &salt).0 == self.0
    }

    /// Stored representation for persistence.
    pub fn as_stored(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(..)")
    }
}

/// Registered account with admin capabilities flagged per user.
///
/// ## Invariants
/// - `email` is unique across accounts (enforced by the users table).
/// - `password_hash` never leaves the domain; the serde representation
///   exposes only id, email, display name, admin flag, and timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserId,
    pub email: EmailAddress,
    pub display_name: DisplayName,
    pub is_admin: bool,
    pub password_hash: PasswordHash,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Build a freshly registered user with `now` timestamps.
    pub fn new(
        email: EmailAddress,
        display_name: DisplayName,
        is_admin: bool,
        password_hash: PasswordHash,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: UserId::random(),
            email,
            display_name,
            is_admin,
            password_hash,
            created_at: now,
            updated_at: now,
        }
    }
}

/// API-facing view of a [`User`], without credential material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[schema(value_type = String, example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: UserId,
    pub email: EmailAddress,
    pub display_name: DisplayName,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            display_name: user.display_name.clone(),
            is_admin: user.is_admin,
            created_at: user.created_at,
        }
    }
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self::from(&user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("ada@example.com")]
    #[case("sales@plating.example.co.uk")]
    #[case("  Mixed.Case@Example.COM  ")]
    fn valid_emails_are_accepted(#[case] raw: &str) {
        EmailAddress::new(raw).expect("valid email");
    }

    #[rstest]
    #[case("")]
    #[case("no-at-sign")]
    #[case("two@@example.com")]
    #[case("spaces in@example.com")]
    #[case("missing@tld")]
    #[case("@example.com")]
    fn invalid_emails_are_rejected(#[case] raw: &str) {
        assert!(EmailAddress::new(raw).is_err(), "{raw:?} should be invalid");
    }

    #[test]
    fn emails_are_normalised_to_lowercase() {
        let email = EmailAddress::new("Ada@Example.COM").expect("valid email");
        assert_eq!(email.as_ref(), "ada@example.com");
    }

    #[test]
    fn overlong_email_is_rejected() {
        let raw = format!("{}@example.com", "a".repeat(EMAIL_MAX));
        assert_eq!(
            EmailAddress::new(raw),
            Err(UserValidationError::EmailTooLong { max: EMAIL_MAX })
        );
    }

    #[test]
    fn password_hash_verifies_matching_password() {
        let hash = PasswordHash::derive("correct horse battery").expect("hash");
        assert!(hash.verify("correct horse battery"));
        assert!(!hash.verify("wrong password"));
    }

    #[test]
    fn password_hash_round_trips_through_storage() {
        let hash = PasswordHash::derive("electroplate").expect("hash");
        let restored = PasswordHash::from_stored(hash.as_stored());
        assert!(restored.verify("electroplate"));
    }

    #[test]
    fn distinct_salts_produce_distinct_digests() {
        let a = PasswordHash::derive("electroplate").expect("hash");
        let b = PasswordHash::derive("electroplate").expect("hash");
        assert_ne!(a.as_stored(), b.as_stored());
    }

    #[test]
    fn short_password_is_rejected() {
        assert_eq!(
            PasswordHash::derive("short"),
            Err(UserValidationError::PasswordTooShort { min: PASSWORD_MIN })
        );
    }

    #[test]
    fn malformed_stored_hash_never_verifies() {
        let hash = PasswordHash::from_stored("not-a-real-hash");
        assert!(!hash.verify("anything"));
    }

    #[test]
    fn profile_omits_credentials() {
        let user = User::new(
            EmailAddress::new("ada@example.com").expect("email"),
            DisplayName::new("Ada").expect("name"),
            true,
            PasswordHash::derive("electroplate").expect("hash"),
            Utc::now(),
        );
        let profile = UserProfile::from(&user);
        let raw = serde_json::to_value(&profile).expect("serialize profile");
        assert!(raw.get("passwordHash").is_none());
        assert_eq!(raw["isAdmin"], serde_json::json!(true));
    }
}
