//! Contact-form submissions and their triage lifecycle.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::user::EmailAddress;

/// Maximum length accepted for a sender name.
pub const SENDER_NAME_MAX: usize = 120;
/// Maximum length accepted for a company name.
pub const COMPANY_MAX: usize = 120;
/// Maximum length accepted for a message body (8 KiB).
pub const MESSAGE_MAX: usize = 8 * 1024;
/// Digit bounds for a phone number once separators are stripped.
pub const PHONE_DIGITS_MIN: usize = 7;
/// Upper digit bound (ITU E.164).
pub const PHONE_DIGITS_MAX: usize = 15;

/// Validation errors for contact submissions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContactValidationError {
    #[error("name must not be empty")]
    EmptyName,
    #[error("name must be at most {max} characters")]
    NameTooLong { max: usize },
    #[error("company must be at most {max} characters")]
    CompanyTooLong { max: usize },
    #[error("message must not be empty")]
    EmptyMessage,
    #[error("message must be at most {max} characters")]
    MessageTooLong { max: usize },
    #[error("phone number is not valid")]
    InvalidPhone,
}

/// Validated phone number.
///
/// Accepts an optional leading `+` and digits interleaved with spaces,
/// dashes, dots, or parentheses. Between [`PHONE_DIGITS_MIN`] and
/// [`PHONE_DIGITS_MAX`] digits must remain after separators are stripped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, example = "+44 20 7946 0958")]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Validate and construct a [`PhoneNumber`], preserving the input shape.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ContactValidationError> {
        let candidate = raw.as_ref().trim();
        let mut digits = 0usize;
        for (index, ch) in candidate.chars().enumerate() {
            match ch {
                '0'..='9' => digits += 1,
                '+' if index == 0 => {}
                ' ' | '-' | '.' | '(' | ')' => {}
                _ => return Err(ContactValidationError::InvalidPhone),
            }
        }
        if !(PHONE_DIGITS_MIN..=PHONE_DIGITS_MAX).contains(&digits) {
            return Err(ContactValidationError::InvalidPhone);
        }
        Ok(Self(candidate.to_owned()))
    }
}

impl AsRef<str> for PhoneNumber {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<PhoneNumber> for String {
    fn from(value: PhoneNumber) -> Self {
        value.0
    }
}

impl TryFrom<String> for PhoneNumber {
    type Error = ContactValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Triage state of a contact submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    /// Freshly received, nobody has looked at it.
    New,
    /// Seen by an operator.
    Read,
    /// Answered by an operator.
    Replied,
    /// Closed out.
    Archived,
}

impl SubmissionStatus {
    /// Stable string used in the database and query parameters.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Read => "read",
            Self::Replied => "replied",
            Self::Archived => "archived",
        }
    }

    /// Parse the stable string form.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "new" => Some(Self::New),
            "read" => Some(Self::Read),
            "replied" => Some(Self::Replied),
            "archived" => Some(Self::Archived),
            _ => None,
        }
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated contents of a contact-form submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactRequest {
    pub name: String,
    pub email: EmailAddress,
    pub phone: Option<PhoneNumber>,
    pub company: Option<String>,
    pub message: String,
}

impl ContactRequest {
    /// Validate the free-text parts of a submission.
    ///
    /// `email` and `phone` carry their own validation; this enforces the
    /// bounds on name, company, and message.
    pub fn new(
        name: impl Into<String>,
        email: EmailAddress,
        phone: Option<PhoneNumber>,
        company: Option<String>,
        message: impl Into<String>,
    ) -> Result<Self, ContactValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ContactValidationError::EmptyName);
        }
        if name.chars().count() > SENDER_NAME_MAX {
            return Err(ContactValidationError::NameTooLong {
                max: SENDER_NAME_MAX,
            });
        }
        if let Some(company) = &company
            && company.chars().count() > COMPANY_MAX
        {
            return Err(ContactValidationError::CompanyTooLong { max: COMPANY_MAX });
        }
        let message = message.into();
        if message.trim().is_empty() {
            return Err(ContactValidationError::EmptyMessage);
        }
        if message.chars().count() > MESSAGE_MAX {
            return Err(ContactValidationError::MessageTooLong { max: MESSAGE_MAX });
        }
        Ok(Self {
            name,
            email,
            phone,
            company,
            message,
        })
    }
}

/// Stored contact-form submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContactSubmission {
    pub id: Uuid,
    pub name: String,
    pub email: EmailAddress,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<PhoneNumber>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    pub message: String,
    pub status: SubmissionStatus,
    pub created_at: DateTime<Utc>,
}

impl ContactSubmission {
    /// Build a fresh submission from a validated request.
    pub fn from_request(request: ContactRequest, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: request.name,
            email: request.email,
            phone: request.phone,
            company: request.company,
            message: request.message,
            status: SubmissionStatus::New,
            created_at: now,
        }
    }
}
