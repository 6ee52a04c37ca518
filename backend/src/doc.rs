//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] assembles the specification from the inbound handlers'
//! `utoipa::path` annotations plus the shared schemas. Swagger UI serves
//! it in debug builds at `/docs`.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::contact::{ContactSubmission, PhoneNumber, SubmissionStatus};
use crate::domain::content::ContentBlock;
use crate::domain::user::UserProfile;
use crate::domain::{Error, ErrorCode};
use crate::inbound::http::account::{CodeRequest, EmailChangeRequest, PasswordConfirmRequest};
use crate::inbound::http::auth::LoginRequest;
use crate::inbound::http::contact::{ContactFormRequest, StatusChangeRequest};
use crate::inbound::http::content::ContentBlockRequest;

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Plateworks backend API",
        description = "Content management, contact intake, and account \
                       administration for the Plateworks site."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::logout,
        crate::inbound::http::content::get_page_content,
        crate::inbound::http::content::create_content_block,
        crate::inbound::http::content::update_content_block,
        crate::inbound::http::content::delete_content_block,
        crate::inbound::http::contact::submit_contact_form,
        crate::inbound::http::contact::list_contact_submissions,
        crate::inbound::http::contact::set_submission_status,
        crate::inbound::http::account::get_profile,
        crate::inbound::http::account::request_email_change,
        crate::inbound::http::account::confirm_email_change,
        crate::inbound::http::account::request_password_change,
        crate::inbound::http::account::confirm_password_change,
        crate::inbound::http::account::list_users,
        crate::inbound::http::account::request_user_deletion,
        crate::inbound::http::account::confirm_user_deletion,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        UserProfile,
        ContentBlock,
        ContentBlockRequest,
        ContactSubmission,
        ContactFormRequest,
        StatusChangeRequest,
        SubmissionStatus,
        PhoneNumber,
        LoginRequest,
        EmailChangeRequest,
        CodeRequest,
        PasswordConfirmRequest,
    )),
    tags(
        (name = "auth", description = "Session establishment and teardown"),
        (name = "content", description = "Page content blocks"),
        (name = "contact", description = "Contact-form intake and triage"),
        (name = "account", description = "The caller's own account"),
        (name = "users", description = "User administration"),
        (name = "health", description = "Probes for orchestration")
    )
)]
pub struct ApiDoc;
