//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    AccountCommand, AccountQuery, ContactIntake, ContactTriage, ContentCommand, ContentQuery,
    LoginService,
};

/// Dependency bundle for HTTP handlers, one field per driving port.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub content_query: Arc<dyn ContentQuery>,
    pub content: Arc<dyn ContentCommand>,
    pub contact_intake: Arc<dyn ContactIntake>,
    pub contact_triage: Arc<dyn ContactTriage>,
    pub accounts_query: Arc<dyn AccountQuery>,
    pub accounts: Arc<dyn AccountCommand>,
}
