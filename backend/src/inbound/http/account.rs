//! Account and user-management HTTP handlers.
//!
//! All routes require a session. Mutations follow the request/confirm OTP
//! pattern: `request` endpoints answer `202 Accepted` once the code has been
//! emailed, `confirm` endpoints commit the change.

use actix_web::{HttpResponse, get, post, web};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::domain::Error;
use crate::domain::user::{EmailAddress, UserId, UserProfile};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::require_admin;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{invalid_field_error, missing_field_error, parse_uuid};

/// Request payload for starting an email change.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmailChangeRequest {
    pub new_email: Option<String>,
}

/// Verification code on its own, used by single-step confirmations.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CodeRequest {
    pub code: Option<String>,
}

/// Request payload for completing a password change.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PasswordConfirmRequest {
    pub code: Option<String>,
    pub new_password: Option<String>,
}

fn require_code(code: Option<String>) -> Result<String, Error> {
    code.ok_or_else(|| missing_field_error("code"))
}

fn target_user_id(raw: &str) -> Result<UserId, Error> {
    parse_uuid(raw, "id").map(UserId::from_uuid)
}

/// The caller's own profile.
#[utoipa::path(
    get,
    path = "/api/v1/profile",
    responses(
        (status = 200, description = "Caller profile", body = UserProfile),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["account"],
    operation_id = "getProfile"
)]
#[get("/profile")]
pub async fn get_profile(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<UserProfile>> {
    let user_id = session.require_user_id()?;
    let user = state.accounts_query.profile(&user_id).await?;
    Ok(web::Json(UserProfile::from(user)))
}

/// Start an email change; the code goes to the current address.
#[utoipa::path(
    post,
    path = "/api/v1/profile/email/request",
    request_body = EmailChangeRequest,
    responses(
        (status = 202, description = "Verification code sent"),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 409, description = "Address already in use", body = Error),
        (status = 503, description = "Code could not be delivered", body = Error)
    ),
    tags = ["account"],
    operation_id = "requestEmailChange"
)]
#[post("/profile/email/request")]
pub async fn request_email_change(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<EmailChangeRequest>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let new_email = payload
        .into_inner()
        .new_email
        .ok_or_else(|| missing_field_error("newEmail"))?;
    let new_email =
        EmailAddress::new(new_email).map_err(|error| invalid_field_error("newEmail", error))?;
    state.accounts.request_email_change(&user_id, new_email).await?;
    Ok(HttpResponse::Accepted().finish())
}

/// Verify the code and commit the pending email change.
#[utoipa::path(
    post,
    path = "/api/v1/profile/email/confirm",
    request_body = CodeRequest,
    responses(
        (status = 200, description = "Email updated", body = UserProfile),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Code rejected", body = Error)
    ),
    tags = ["account"],
    operation_id = "confirmEmailChange"
)]
#[post("/profile/email/confirm")]
pub async fn confirm_email_change(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CodeRequest>,
) -> ApiResult<web::Json<UserProfile>> {
    let user_id = session.require_user_id()?;
    let code = require_code(payload.into_inner().code)?;
    let user = state.accounts.confirm_email_change(&user_id, &code).await?;
    Ok(web::Json(UserProfile::from(user)))
}

/// Start a password change for the caller.
#[utoipa::path(
    post,
    path = "/api/v1/profile/password/request",
    responses(
        (status = 202, description = "Verification code sent"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 503, description = "Code could not be delivered", body = Error)
    ),
    tags = ["account"],
    operation_id = "requestPasswordChange"
)]
#[post("/profile/password/request")]
pub async fn request_password_change(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    state.accounts.request_password_change(&user_id).await?;
    Ok(HttpResponse::Accepted().finish())
}

/// Verify the code and set the new password.
#[utoipa::path(
    post,
    path = "/api/v1/profile/password/confirm",
    request_body = PasswordConfirmRequest,
    responses(
        (status = 204, description = "Password updated"),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Code rejected", body = Error)
    ),
    tags = ["account"],
    operation_id = "confirmPasswordChange"
)]
#[post("/profile/password/confirm")]
pub async fn confirm_password_change(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<PasswordConfirmRequest>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let payload = payload.into_inner();
    let code = require_code(payload.code)?;
    let new_password = payload
        .new_password
        .ok_or_else(|| missing_field_error("newPassword"))?;
    state
        .accounts
        .confirm_password_change(&user_id, &code, &new_password)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// All accounts, for the admin dashboard.
#[utoipa::path(
    get,
    path = "/api/v1/users",
    responses(
        (status = 200, description = "All accounts", body = [UserProfile]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Admin role required", body = Error)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<UserProfile>>> {
    require_admin(&state, &session).await?;
    let users = state.accounts_query.list_users().await?;
    Ok(web::Json(
        users.into_iter().map(UserProfile::from).collect(),
    ))
}

/// Start deletion of another account; the code goes to the acting admin.
#[utoipa::path(
    post,
    path = "/api/v1/users/{id}/delete/request",
    params(("id" = String, Path, description = "Target user id")),
    responses(
        (status = 202, description = "Verification code sent"),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Admin role required", body = Error),
        (status = 404, description = "Target not found", body = Error),
        (status = 503, description = "Code could not be delivered", body = Error)
    ),
    tags = ["users"],
    operation_id = "requestUserDeletion"
)]
#[post("/users/{id}/delete/request")]
pub async fn request_user_deletion(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let admin_id = require_admin(&state, &session).await?;
    let target = target_user_id(&path.into_inner())?;
    state.accounts.request_user_deletion(&admin_id, &target).await?;
    Ok(HttpResponse::Accepted().finish())
}

/// Verify the code and delete the target account.
#[utoipa::path(
    post,
    path = "/api/v1/users/{id}/delete/confirm",
    params(("id" = String, Path, description = "Target user id")),
    request_body = CodeRequest,
    responses(
        (status = 204, description = "Account deleted"),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Code rejected", body = Error),
        (status = 403, description = "Admin role required", body = Error),
        (status = 404, description = "Target not found", body = Error)
    ),
    tags = ["users"],
    operation_id = "confirmUserDeletion"
)]
#[post("/users/{id}/delete/confirm")]
pub async fn confirm_user_deletion(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<CodeRequest>,
) -> ApiResult<HttpResponse> {
    let admin_id = require_admin(&state, &session).await?;
    let target = target_user_id(&path.into_inner())?;
    let code = require_code(payload.into_inner().code)?;
    state
        .accounts
        .confirm_user_deletion(&admin_id, &target, &code)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
