//! Backend library for the Plateworks marketing site.
//!
//! Hexagonal layout: `domain` holds the business rules and ports,
//! `inbound` the HTTP adapter, `outbound` the database, cache, and SMTP
//! adapters, and `server` the wiring that assembles a running process.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
