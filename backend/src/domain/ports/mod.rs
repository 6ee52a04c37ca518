//! Ports decoupling the domain from its adapters.
//!
//! Driven ports (repositories, mailer, cache) are implemented by outbound
//! adapters; driving ports (queries and commands) are implemented by domain
//! services and consumed by the HTTP layer. Every port is mockable in tests.

pub mod account_ops;
pub mod contact_ops;
pub mod contact_repository;
pub mod content_ops;
pub mod content_repository;
pub mod mailer;
pub mod otp_repository;
pub mod result_cache;
pub mod user_repository;

pub use account_ops::{AccountCommand, AccountQuery, LoginService};
pub use contact_ops::{ContactIntake, ContactTriage, SubmissionFilter};
pub use contact_repository::{ContactRepository, ContactRepositoryError};
pub use content_ops::{ContentCommand, ContentQuery};
pub use content_repository::{ContentRepository, ContentRepositoryError};
pub use mailer::{Mailer, MailerError, OutboundEmail};
pub use otp_repository::{OtpRepository, OtpRepositoryError};
pub use result_cache::ResultCache;
pub use user_repository::{UserRepository, UserRepositoryError};

#[cfg(test)]
pub use account_ops::{MockAccountCommand, MockAccountQuery, MockLoginService};
#[cfg(test)]
pub use contact_ops::{MockContactIntake, MockContactTriage};
#[cfg(test)]
pub use contact_repository::MockContactRepository;
#[cfg(test)]
pub use content_ops::{MockContentCommand, MockContentQuery};
#[cfg(test)]
pub use content_repository::MockContentRepository;
#[cfg(test)]
pub use mailer::MockMailer;
#[cfg(test)]
pub use otp_repository::MockOtpRepository;
#[cfg(test)]
pub use result_cache::MockResultCache;
#[cfg(test)]
pub use user_repository::MockUserRepository;
