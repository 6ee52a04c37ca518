//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::Key;

use crate::domain::ports::{
    MockAccountCommand, MockAccountQuery, MockContactIntake, MockContactTriage,
    MockContentCommand, MockContentQuery, MockLoginService,
};
use crate::inbound::http::state::HttpState;

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Build an [`HttpState`] where every port is an expectation-free mock.
///
/// Tests replace the fields they exercise; touching any other port fails
/// the test, which keeps handler coverage honest about its dependencies.
pub fn http_state() -> HttpState {
    HttpState {
        login: Arc::new(MockLoginService::new()),
        content_query: Arc::new(MockContentQuery::new()),
        content: Arc::new(MockContentCommand::new()),
        contact_intake: Arc::new(MockContactIntake::new()),
        contact_triage: Arc::new(MockContactTriage::new()),
        accounts_query: Arc::new(MockAccountQuery::new()),
        accounts: Arc::new(MockAccountCommand::new()),
    }
}
