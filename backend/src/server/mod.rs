//! Server construction and middleware wiring.

mod config;

pub use config::{AppConfig, ConfigError};

use std::sync::Arc;

use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
};
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use mockable::{Clock, DefaultClock};
use tracing::error;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::domain::ports::Mailer;
use crate::domain::{AccountService, ContactService, ContentService};
use crate::inbound::http::account::{
    confirm_email_change, confirm_password_change, confirm_user_deletion, get_profile,
    list_users, request_email_change, request_password_change, request_user_deletion,
};
use crate::inbound::http::auth::{login, logout};
use crate::inbound::http::contact::{
    list_contact_submissions, set_submission_status, submit_contact_form,
};
use crate::inbound::http::content::{
    create_content_block, delete_content_block, get_page_content, update_content_block,
};
use crate::inbound::http::health::{HealthState, live, ready};
use crate::inbound::http::state::HttpState;
use crate::middleware::Trace;
use crate::outbound::cache::MemoryResultCache;
use crate::outbound::email::SmtpMailer;
use crate::outbound::persistence::{
    DbPool, DieselContactRepository, DieselContentRepository, DieselOtpRepository,
    DieselUserRepository, PoolError,
};

/// Wire domain services onto database, cache, and SMTP adapters.
///
/// # Errors
///
/// Fails when the SMTP relay configuration is invalid.
pub fn build_http_state(config: &AppConfig, pool: DbPool) -> std::io::Result<HttpState> {
    let mailer: Arc<dyn Mailer> = Arc::new(
        SmtpMailer::new(&config.smtp)
            .map_err(|err| std::io::Error::other(format!("mailer setup failed: {err}")))?,
    );
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);

    let accounts = Arc::new(AccountService::new(
        Arc::new(DieselUserRepository::new(pool.clone())),
        Arc::new(DieselOtpRepository::new(pool.clone())),
        mailer.clone(),
        clock.clone(),
        config.otp_ttl,
    ));
    let content = Arc::new(ContentService::new(
        Arc::new(DieselContentRepository::new(pool.clone())),
        Arc::new(MemoryResultCache::new()),
        config.content_cache_ttl,
        clock.clone(),
    ));
    let contact = Arc::new(ContactService::new(
        Arc::new(DieselContactRepository::new(pool)),
        mailer,
        config.contact_inbox.clone(),
        clock,
    ));

    Ok(HttpState {
        login: accounts.clone(),
        content_query: content.clone(),
        content,
        contact_intake: contact.clone(),
        contact_triage: contact,
        accounts_query: accounts.clone(),
        accounts,
    })
}

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    key: Key,
    cookie_secure: bool,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        key,
        cookie_secure,
    } = deps;

    let session = SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(SameSite::Lax)
        .session_lifecycle(
            PersistentSession::default().session_ttl(actix_web::cookie::time::Duration::hours(2)),
        )
        .build();

    let api = web::scope("/api/v1")
        .wrap(session)
        .service(login)
        .service(logout)
        .service(get_page_content)
        .service(create_content_block)
        .service(update_content_block)
        .service(delete_content_block)
        .service(submit_contact_form)
        .service(list_contact_submissions)
        .service(set_submission_status)
        .service(get_profile)
        .service(request_email_change)
        .service(confirm_email_change)
        .service(request_password_change)
        .service(confirm_password_change)
        .service(list_users)
        .service(request_user_deletion)
        .service(confirm_user_deletion);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Flip readiness only when the database answered the startup ping.
///
/// The server still starts on a failed ping: repositories retry connection
/// failures on their own, but `/health/ready` keeps reporting 503 until an
/// instance with a reachable database takes over.
fn record_database_health(health_state: &HealthState, outcome: Result<(), PoolError>) {
    match outcome {
        Ok(()) => health_state.mark_ready(),
        Err(err) => {
            error!(error = %err, "database unreachable at startup, readiness withheld");
        }
    }
}

/// Construct the HTTP server from resolved configuration and a live pool.
///
/// Marks `health_state` ready once the listener is bound and the database
/// has answered the startup ping.
///
/// # Errors
///
/// Propagates [`std::io::Error`] when mailer setup or socket binding fails.
pub async fn create_server(
    health_state: web::Data<HealthState>,
    config: AppConfig,
    pool: DbPool,
) -> std::io::Result<Server> {
    let database_health = pool.health_check().await;
    let http_state = web::Data::new(build_http_state(&config, pool)?);
    let server_health_state = health_state.clone();
    let key = config.session_key.clone();
    let cookie_secure = config.cookie_secure;

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            key: key.clone(),
            cookie_secure,
        })
    })
    .bind(config.bind_addr)?
    .run();

    record_database_health(&health_state, database_health);
    Ok(server)
}
