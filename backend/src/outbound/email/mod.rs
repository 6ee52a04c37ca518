//! SMTP mailer adapter built on lettre.
//!
//! Messages go out as multipart/alternative with text and HTML parts over
//! a STARTTLS relay connection.

use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::domain::ports::{Mailer, MailerError, OutboundEmail};

/// SMTP relay configuration.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    /// Relay credentials; omit for an unauthenticated relay.
    pub credentials: Option<(String, String)>,
    /// Sender address placed in the `From` header.
    pub from: String,
}

/// Mailer dispatching through an SMTP relay.
#[derive(Debug)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    /// Build a mailer from relay configuration.
    ///
    /// # Errors
    ///
    /// Returns [`MailerError::Address`] when the sender address does not
    /// parse and [`MailerError::Transport`] when the relay cannot be
    /// configured.
    pub fn new(config: &SmtpConfig) -> Result<Self, MailerError> {
        let from: Mailbox = config
            .from
            .parse()
            .map_err(|err| MailerError::address(format!("sender address invalid: {err}")))?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|err| MailerError::transport(err.to_string()))?
            .port(config.port);
        if let Some((username, password)) = &config.credentials {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }

    fn compose(&self, email: &OutboundEmail) -> Result<Message, MailerError> {
        let to: Mailbox = email
            .to
            .as_ref()
            .parse()
            .map_err(|err| MailerError::address(format!("recipient address invalid: {err}")))?;

        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(&email.subject)
            .multipart(MultiPart::alternative_plain_html(
                email.text_body.clone(),
                email.html_body.clone(),
            ))
            .map_err(|err| MailerError::transport(format!("message assembly failed: {err}")))
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<(), MailerError> {
        let message = self.compose(email)?;
        self.transport
            .send(message)
            .await
            .map(|_| ())
            .map_err(|err| MailerError::transport(err.to_string()))
    }
}
