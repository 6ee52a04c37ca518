//! Contact-form HTTP handlers.
//!
//! Intake is public; listing and triage require the administrator role.

use actix_web::{HttpResponse, get, patch, post, web};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::domain::contact::{
    ContactRequest, ContactSubmission, PhoneNumber, SubmissionStatus,
};
use crate::domain::ports::SubmissionFilter;
use crate::domain::user::EmailAddress;
use crate::domain::Error;
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::require_admin;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{invalid_field_error, missing_field_error, parse_uuid};

/// Request payload for `POST /api/v1/contact`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContactFormRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub message: Option<String>,
}

/// Query parameters for the triage listing.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct SubmissionListQuery {
    /// Restrict to one triage status (`new`, `read`, `replied`, `archived`).
    pub status: Option<String>,
    /// Page size, clamped server-side.
    pub limit: Option<i64>,
}

/// Request payload for `PATCH /api/v1/contact/{id}/status`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusChangeRequest {
    pub status: Option<String>,
}

fn parse_contact_form(payload: ContactFormRequest) -> Result<ContactRequest, Error> {
    let name = payload.name.ok_or_else(|| missing_field_error("name"))?;
    let email = payload.email.ok_or_else(|| missing_field_error("email"))?;
    let message = payload
        .message
        .ok_or_else(|| missing_field_error("message"))?;

    let email = EmailAddress::new(email).map_err(|error| invalid_field_error("email", error))?;
    let phone = payload
        .phone
        .map(|raw| PhoneNumber::new(raw).map_err(|error| invalid_field_error("phone", error)))
        .transpose()?;
    ContactRequest::new(name, email, phone, payload.company, message)
        .map_err(|error| invalid_field_error("message", error))
}

fn parse_status(raw: &str) -> Result<SubmissionStatus, Error> {
    SubmissionStatus::parse(raw)
        .ok_or_else(|| invalid_field_error("status", format!("unknown status: {raw}")))
}

/// Accept a contact-form submission from the public site.
#[utoipa::path(
    post,
    path = "/api/v1/contact",
    request_body = ContactFormRequest,
    responses(
        (status = 201, description = "Submission recorded", body = ContactSubmission),
        (status = 400, description = "Invalid request", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["contact"],
    operation_id = "submitContactForm"
)]
#[post("/contact")]
pub async fn submit_contact_form(
    state: web::Data<HttpState>,
    payload: web::Json<ContactFormRequest>,
) -> ApiResult<HttpResponse> {
    let request = parse_contact_form(payload.into_inner())?;
    let submission = state.contact_intake.submit(request).await?;
    Ok(HttpResponse::Created().json(submission))
}

/// List submissions for triage, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/contact",
    params(SubmissionListQuery),
    responses(
        (status = 200, description = "Submissions", body = [ContactSubmission]),
        (status = 400, description = "Invalid filter", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Admin role required", body = Error)
    ),
    tags = ["contact"],
    operation_id = "listContactSubmissions"
)]
#[get("/contact")]
pub async fn list_contact_submissions(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<SubmissionListQuery>,
) -> ApiResult<web::Json<Vec<ContactSubmission>>> {
    require_admin(&state, &session).await?;
    let query = query.into_inner();
    let status = query.status.as_deref().map(parse_status).transpose()?;
    let filter = SubmissionFilter::new(status, query.limit);
    let submissions = state.contact_triage.list(filter).await?;
    Ok(web::Json(submissions))
}

/// Move a submission to a new triage status.
#[utoipa::path(
    patch,
    path = "/api/v1/contact/{id}/status",
    params(("id" = String, Path, description = "Submission id")),
    request_body = StatusChangeRequest,
    responses(
        (status = 200, description = "Submission updated", body = ContactSubmission),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Admin role required", body = Error),
        (status = 404, description = "Submission not found", body = Error)
    ),
    tags = ["contact"],
    operation_id = "setSubmissionStatus"
)]
#[patch("/contact/{id}/status")]
pub async fn set_submission_status(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<StatusChangeRequest>,
) -> ApiResult<web::Json<ContactSubmission>> {
    require_admin(&state, &session).await?;
    let id = parse_uuid(&path.into_inner(), "id")?;
    let status = payload
        .into_inner()
        .status
        .ok_or_else(|| missing_field_error("status"))?;
    let status = parse_status(&status)?;
    let submission = state.contact_triage.set_status(id, status).await?;
    Ok(web::Json(submission))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::MockContactIntake;
    use crate::inbound::http::test_utils::{http_state, test_session_middleware};
    use actix_web::http::StatusCode;
    use actix_web::App;
    use actix_web::test as actix_test;
    use chrono::Utc;
    use rstest::rstest;
    use serde_json::json;
    use std::sync::Arc;

    fn submission() -> ContactSubmission {
        let request = ContactRequest::new(
            "Ada Lovelace",
            EmailAddress::new("ada@example.com").expect("email"),
            None,
            Some("Analytical Engines Ltd".to_owned()),
            "Please quote for nickel plating 200 gears.",
        )
        .expect("request");
        ContactSubmission::from_request(request, Utc::now())
    }

    #[rstest]
    fn form_without_message_is_rejected() {
        let payload = ContactFormRequest {
            name: Some("Ada".to_owned()),
            email: Some("ada@example.com".to_owned()),
            phone: None,
            company: None,
            message: None,
        };

        let error = parse_contact_form(payload).expect_err("missing message");
        assert_eq!(error.details().expect("details")["field"], "message");
    }

    #[rstest]
    fn form_with_bad_phone_is_rejected() {
        let payload = ContactFormRequest {
            name: Some("Ada".to_owned()),
            email: Some("ada@example.com".to_owned()),
            phone: Some("call me maybe".to_owned()),
            company: None,
            message: Some("quote please".to_owned()),
        };

        let error = parse_contact_form(payload).expect_err("bad phone");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
        assert_eq!(error.details().expect("details")["field"], "phone");
    }

    #[rstest]
    #[case("new", SubmissionStatus::New)]
    #[case("archived", SubmissionStatus::Archived)]
    fn known_statuses_parse(#[case] raw: &str, #[case] expected: SubmissionStatus) {
        assert_eq!(parse_status(raw).expect("status"), expected);
    }

    #[rstest]
    fn unknown_status_is_invalid_request() {
        let error = parse_status("binned").expect_err("unknown status");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
    }

    #[actix_web::test]
    async fn valid_submission_is_created() {
        let stored = submission();
        let returned = stored.clone();

        let mut intake = MockContactIntake::new();
        intake
            .expect_submit()
            .times(1)
            .return_once(move |_| Ok(returned));

        let mut state = http_state();
        state.contact_intake = Arc::new(intake);

        let app = actix_test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .app_data(web::Data::new(state))
                .service(web::scope("/api/v1").service(submit_contact_form)),
        )
        .await;

        let req = actix_test::TestRequest::post()
            .uri("/api/v1/contact")
            .set_json(json!({
                "name": "Ada Lovelace",
                "email": "ada@example.com",
                "company": "Analytical Engines Ltd",
                "message": "Please quote for nickel plating 200 gears.",
            }))
            .to_request();
        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::CREATED);

        let body: ContactSubmission = actix_test::read_body_json(res).await;
        assert_eq!(body, stored);
    }

    #[actix_web::test]
    async fn invalid_email_is_rejected_before_the_service_runs() {
        let app = actix_test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .app_data(web::Data::new(http_state()))
                .service(web::scope("/api/v1").service(submit_contact_form)),
        )
        .await;

        let req = actix_test::TestRequest::post()
            .uri("/api/v1/contact")
            .set_json(json!({
                "name": "Ada",
                "email": "not-an-email",
                "message": "quote please",
            }))
            .to_request();
        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn listing_without_session_is_unauthorised() {
        let app = actix_test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .app_data(web::Data::new(http_state()))
                .service(web::scope("/api/v1").service(list_contact_submissions)),
        )
        .await;

        let req = actix_test::TestRequest::get()
            .uri("/api/v1/contact?status=new")
            .to_request();
        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
