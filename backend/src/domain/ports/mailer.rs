//! Port for outbound transactional email.

use async_trait::async_trait;

use crate::domain::user::EmailAddress;

/// Errors raised by mailer adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MailerError {
    /// The recipient or sender address was rejected by the transport layer.
    #[error("mail address rejected: {message}")]
    Address { message: String },

    /// The SMTP transport failed to deliver the message.
    #[error("mail transport failed: {message}")]
    Transport { message: String },
}

impl MailerError {
    /// Create an address error with the given message.
    pub fn address(message: impl Into<String>) -> Self {
        Self::Address {
            message: message.into(),
        }
    }

    /// Create a transport error with the given message.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }
}

/// A fully composed transactional message.
///
/// Bodies come in both text and HTML form; adapters send them as a
/// multipart/alternative message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    pub to: EmailAddress,
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
}

/// Port for dispatching transactional email.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send a single message.
    async fn send(&self, email: &OutboundEmail) -> Result<(), MailerError>;
}
