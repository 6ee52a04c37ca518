//! Environment-driven application configuration.
//!
//! All required settings are collected in one pass so a misconfigured
//! deployment reports every missing variable at once instead of failing
//! on the first.

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use actix_web::cookie::Key;
use tracing::warn;

use crate::domain::user::EmailAddress;
use crate::outbound::email::SmtpConfig;

/// Configuration failures at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variables: {names}")]
    Missing { names: String },

    #[error("invalid value for {name}: {message}")]
    Invalid { name: &'static str, message: String },

    #[error("session key unavailable: {message}")]
    SessionKey { message: String },
}

/// Fully resolved application settings.
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub database_url: String,
    pub smtp: SmtpConfig,
    /// Inbox that receives contact-form notifications.
    pub contact_inbox: EmailAddress,
    pub session_key: Key,
    pub cookie_secure: bool,
    pub content_cache_ttl: Duration,
    pub otp_ttl: chrono::Duration,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("bind_addr", &self.bind_addr)
            .field("database_url", &self.database_url)
            .field("smtp", &self.smtp)
            .field("contact_inbox", &self.contact_inbox)
            .field("session_key", &"<redacted>")
            .field("cookie_secure", &self.cookie_secure)
            .field("content_cache_ttl", &self.content_cache_ttl)
            .field("otp_ttl", &self.otp_ttl)
            .finish()
    }
}

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_SMTP_PORT: u16 = 587;
const DEFAULT_CACHE_TTL_SECS: u64 = 300;
const DEFAULT_OTP_TTL_SECS: i64 = 600;

impl AppConfig {
    /// Resolve configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] listing every absent required
    /// variable, or [`ConfigError::Invalid`] for the first unparsable one.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut missing = Vec::new();
        let mut require = |name: &'static str| {
            let value = lookup(name);
            if value.is_none() {
                missing.push(name);
            }
            value
        };

        let database_url = require("DATABASE_URL");
        let smtp_host = require("SMTP_HOST");
        let smtp_from = require("SMTP_FROM");
        let contact_inbox = require("CONTACT_INBOX");

        if !missing.is_empty() {
            return Err(ConfigError::Missing {
                names: missing.join(", "),
            });
        }

        // The unwraps above are guarded by the missing check.
        let database_url = database_url.unwrap_or_default();
        let smtp_host = smtp_host.unwrap_or_default();
        let smtp_from = smtp_from.unwrap_or_default();
        let contact_inbox = contact_inbox.unwrap_or_default();

        let bind_addr = lookup("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_owned())
            .parse()
            .map_err(|err| ConfigError::Invalid {
                name: "BIND_ADDR",
                message: format!("{err}"),
            })?;

        let smtp_port = match lookup("SMTP_PORT") {
            Some(raw) => raw.parse().map_err(|err| ConfigError::Invalid {
                name: "SMTP_PORT",
                message: format!("{err}"),
            })?,
            None => DEFAULT_SMTP_PORT,
        };

        let credentials = match (lookup("SMTP_USERNAME"), lookup("SMTP_PASSWORD")) {
            (Some(username), Some(password)) => Some((username, password)),
            (None, None) => None,
            _ => {
                return Err(ConfigError::Invalid {
                    name: "SMTP_USERNAME",
                    message: "SMTP_USERNAME and SMTP_PASSWORD must be set together".to_owned(),
                });
            }
        };

        let contact_inbox =
            EmailAddress::new(&contact_inbox).map_err(|err| ConfigError::Invalid {
                name: "CONTACT_INBOX",
                message: err.to_string(),
            })?;

        let cookie_secure = lookup("SESSION_COOKIE_SECURE").is_none_or(|v| v != "0");

        let content_cache_ttl = parse_secs(&lookup, "CONTENT_CACHE_TTL_SECS")?
            .unwrap_or(DEFAULT_CACHE_TTL_SECS);
        let otp_ttl_secs = match lookup("OTP_TTL_SECS") {
            Some(raw) => raw.parse().map_err(|err| ConfigError::Invalid {
                name: "OTP_TTL_SECS",
                message: format!("{err}"),
            })?,
            None => DEFAULT_OTP_TTL_SECS,
        };

        let session_key = load_session_key(&lookup)?;

        Ok(Self {
            bind_addr,
            database_url,
            smtp: SmtpConfig {
                host: smtp_host,
                port: smtp_port,
                credentials,
                from: smtp_from,
            },
            contact_inbox,
            session_key,
            cookie_secure,
            content_cache_ttl: Duration::from_secs(content_cache_ttl),
            otp_ttl: chrono::Duration::seconds(otp_ttl_secs),
        })
    }
}

fn parse_secs(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<u64>, ConfigError> {
    lookup(name)
        .map(|raw| {
            raw.parse().map_err(|err| ConfigError::Invalid {
                name,
                message: format!("{err}"),
            })
        })
        .transpose()
}

/// Load the session signing key from `SESSION_KEY_FILE`.
///
/// Debug builds (and `SESSION_ALLOW_EPHEMERAL=1`) fall back to a generated
/// key so local development does not need a secrets mount. Release builds
/// without a readable key file refuse to start.
fn load_session_key(lookup: &impl Fn(&str) -> Option<String>) -> Result<Key, ConfigError> {
    let key_path =
        lookup("SESSION_KEY_FILE").unwrap_or_else(|| "/var/run/secrets/session_key".to_owned());
    match std::fs::read(&key_path) {
        Ok(bytes) => Ok(Key::derive_from(&bytes)),
        Err(err) => {
            let allow_dev = lookup("SESSION_ALLOW_EPHEMERAL").as_deref() == Some("1");
            if cfg!(debug_assertions) || allow_dev {
                warn!(path = %key_path, error = %err, "using ephemeral session key (dev only)");
                Ok(Key::generate())
            } else {
                Err(ConfigError::SessionKey {
                    message: format!("failed to read {key_path}: {err}"),
                })
            }
        }
    }
}
