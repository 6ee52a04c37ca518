//! HTTP adapter: REST handlers, session plumbing, and error rendering.

pub mod account;
pub mod auth;
pub mod contact;
pub mod content;
pub mod error;
pub mod health;
pub mod session;
pub mod state;
pub(crate) mod validation;

#[cfg(test)]
pub mod test_utils;

pub use error::{ApiResult, TRACE_ID_HEADER};
pub use health::HealthState;
pub use session::SessionContext;
pub use state::HttpState;
