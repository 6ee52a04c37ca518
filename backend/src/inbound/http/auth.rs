//! Login and logout handlers plus role checks shared by admin endpoints.

use actix_web::{HttpResponse, post, web};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::domain::Error;
use crate::domain::user::{EmailAddress, UserId, UserProfile};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{invalid_field_error, missing_field_error};

/// Request payload for `POST /api/v1/login`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Resolve the caller and require the administrator role.
///
/// Returns `401` without a session and `403` for a non-admin account.
pub(crate) async fn require_admin(
    state: &HttpState,
    session: &SessionContext,
) -> Result<UserId, Error> {
    let user_id = session.require_user_id()?;
    let user = state.accounts_query.profile(&user_id).await?;
    if !user.is_admin {
        return Err(Error::forbidden("administrator role required"));
    }
    Ok(user_id)
}

/// Authenticate with email and password, establishing a session.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = UserProfile),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["auth"],
    operation_id = "login"
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<UserProfile>> {
    let payload = payload.into_inner();
    let email = payload.email.ok_or_else(|| missing_field_error("email"))?;
    let password = payload
        .password
        .ok_or_else(|| missing_field_error("password"))?;
    let email = EmailAddress::new(email).map_err(|error| invalid_field_error("email", error))?;

    let user = state.login.login(&email, &password).await?;
    session.persist_user(&user.id)?;
    Ok(web::Json(UserProfile::from(user)))
}

/// Drop the caller's session.
#[utoipa::path(
    post,
    path = "/api/v1/logout",
    responses(
        (status = 204, description = "Session cleared")
    ),
    tags = ["auth"],
    operation_id = "logout"
)]
#[post("/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.clear();
    HttpResponse::NoContent().finish()
}
