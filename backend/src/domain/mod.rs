//! Domain model: value types, ports, and the services behind them.
//!
//! Nothing in this module knows about HTTP, SQL, or SMTP. Adapters plug in
//! through the traits in [`ports`].

pub mod account_service;
pub mod contact;
pub mod contact_service;
pub mod content;
pub mod content_service;
pub mod error;
pub mod notifications;
pub mod otp;
pub mod ports;
pub mod user;

pub use account_service::AccountService;
pub use contact_service::ContactService;
pub use content_service::ContentService;
pub use error::{Error, ErrorCode};
