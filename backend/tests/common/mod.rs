//! Shared harness wiring real domain services onto in-memory adapters.

use std::sync::Arc;
use std::time::Duration;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use mockable::{Clock, DefaultClock};
use serde_json::json;

use plateworks_backend::domain::ports::Mailer;
use plateworks_backend::domain::user::{DisplayName, EmailAddress, PasswordHash, User};
use plateworks_backend::domain::{AccountService, ContactService, ContentService};
use plateworks_backend::inbound::http::HttpState;
use plateworks_backend::outbound::cache::MemoryResultCache;
use plateworks_backend::test_support::{
    InMemoryContactRepository, InMemoryContentRepository, InMemoryOtpRepository,
    InMemoryUserRepository, RecordingMailer,
};

pub const ADMIN_EMAIL: &str = "admin@plateworks.example";
pub const MEMBER_EMAIL: &str = "member@plateworks.example";
pub const PASSWORD: &str = "electroplate";
pub const CONTACT_INBOX: &str = "sales@plateworks.example";

pub struct Harness {
    pub state: HttpState,
    pub users: Arc<InMemoryUserRepository>,
    pub otps: Arc<InMemoryOtpRepository>,
    pub mailer: Arc<RecordingMailer>,
}

/// Build services over fresh in-memory stores, seeded with an admin and a
/// regular member account.
pub fn harness() -> Harness {
    let admin = User::new(
        EmailAddress::new(ADMIN_EMAIL).expect("email"),
        DisplayName::new("Admin").expect("name"),
        true,
        PasswordHash::derive(PASSWORD).expect("hash"),
        chrono::Utc::now(),
    );
    let member = User::new(
        EmailAddress::new(MEMBER_EMAIL).expect("email"),
        DisplayName::new("Member").expect("name"),
        false,
        PasswordHash::derive(PASSWORD).expect("hash"),
        chrono::Utc::now(),
    );

    let users = Arc::new(InMemoryUserRepository::with_users(vec![admin, member]));
    let otps = Arc::new(InMemoryOtpRepository::new());
    let mailer = Arc::new(RecordingMailer::new());
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);

    let accounts = Arc::new(AccountService::new(
        users.clone(),
        otps.clone(),
        mailer.clone() as Arc<dyn Mailer>,
        clock.clone(),
        chrono::Duration::minutes(10),
    ));
    let content = Arc::new(ContentService::new(
        Arc::new(InMemoryContentRepository::new()),
        Arc::new(MemoryResultCache::new()),
        Duration::from_secs(300),
        clock.clone(),
    ));
    let contact = Arc::new(ContactService::new(
        Arc::new(InMemoryContactRepository::new()),
        mailer.clone() as Arc<dyn Mailer>,
        EmailAddress::new(CONTACT_INBOX).expect("email"),
        clock,
    ));

    let state = HttpState {
        login: accounts.clone(),
        content_query: content.clone(),
        content,
        contact_intake: contact.clone(),
        contact_triage: contact,
        accounts_query: accounts.clone(),
        accounts,
    };

    Harness {
        state,
        users,
        otps,
        mailer,
    }
}

/// Cookie-backed session middleware matching production settings, minus
/// the `Secure` flag so plain-HTTP test requests carry the cookie.
pub fn session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Authenticate against the mounted app and return the session cookie.
pub async fn login_as<S, B, E>(app: &S, email: &str) -> Cookie<'static>
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse<B>,
            Error = E,
        >,
    E: std::fmt::Debug,
    B: actix_web::body::MessageBody,
{
    let req = actix_web::test::TestRequest::post()
        .uri("/api/v1/login")
        .set_json(json!({ "email": email, "password": PASSWORD }))
        .to_request();
    let res = actix_web::test::call_service(app, req).await;
    assert!(res.status().is_success(), "login failed: {}", res.status());
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie")
        .into_owned()
}
