//! Page content HTTP handlers.
//!
//! ```text
//! GET    /api/v1/content/{page}      public
//! POST   /api/v1/content             admin
//! PUT    /api/v1/content/{id}        admin
//! DELETE /api/v1/content/{id}        admin
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::domain::Error;
use crate::domain::content::{ContentBlock, ContentBlockDraft, PageSlug, SectionKey};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::require_admin;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{invalid_field_error, missing_field_error, parse_uuid};

/// Request payload for creating or replacing a content block.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContentBlockRequest {
    pub page: Option<String>,
    pub section: Option<String>,
    pub title: Option<String>,
    pub body: Option<String>,
    pub position: Option<i32>,
}

fn parse_block_request(payload: ContentBlockRequest) -> Result<ContentBlockDraft, Error> {
    let page = payload.page.ok_or_else(|| missing_field_error("page"))?;
    let section = payload
        .section
        .ok_or_else(|| missing_field_error("section"))?;
    let title = payload.title.ok_or_else(|| missing_field_error("title"))?;
    let body = payload.body.ok_or_else(|| missing_field_error("body"))?;
    let position = payload.position.unwrap_or(0);

    let page = PageSlug::new(page).map_err(|error| invalid_field_error("page", error))?;
    let section = SectionKey::new(section).map_err(|error| invalid_field_error("section", error))?;
    ContentBlockDraft::new(page, section, title, body, position)
        .map_err(|error| invalid_field_error("body", error))
}

/// Blocks for a public page, in render order.
#[utoipa::path(
    get,
    path = "/api/v1/content/{page}",
    params(("page" = String, Path, description = "Page slug")),
    responses(
        (status = 200, description = "Blocks for the page", body = [ContentBlock]),
        (status = 400, description = "Invalid page slug", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["content"],
    operation_id = "getPageContent"
)]
#[get("/content/{page}")]
pub async fn get_page_content(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<ContentBlock>>> {
    let page =
        PageSlug::new(path.into_inner()).map_err(|error| invalid_field_error("page", error))?;
    let blocks = state.content_query.page_content(&page).await?;
    Ok(web::Json(blocks))
}

/// Create a content block.
#[utoipa::path(
    post,
    path = "/api/v1/content",
    request_body = ContentBlockRequest,
    responses(
        (status = 201, description = "Block created", body = ContentBlock),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Admin role required", body = Error)
    ),
    tags = ["content"],
    operation_id = "createContentBlock"
)]
#[post("/content")]
pub async fn create_content_block(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<ContentBlockRequest>,
) -> ApiResult<HttpResponse> {
    require_admin(&state, &session).await?;
    let draft = parse_block_request(payload.into_inner())?;
    let block = state.content.create_block(draft).await?;
    Ok(HttpResponse::Created().json(block))
}

/// Replace a content block's fields.
#[utoipa::path(
    put,
    path = "/api/v1/content/{id}",
    params(("id" = String, Path, description = "Block id")),
    request_body = ContentBlockRequest,
    responses(
        (status = 200, description = "Block updated", body = ContentBlock),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Admin role required", body = Error),
        (status = 404, description = "Block not found", body = Error)
    ),
    tags = ["content"],
    operation_id = "updateContentBlock"
)]
#[put("/content/{id}")]
pub async fn update_content_block(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<ContentBlockRequest>,
) -> ApiResult<web::Json<ContentBlock>> {
    require_admin(&state, &session).await?;
    let id = parse_uuid(&path.into_inner(), "id")?;
    let draft = parse_block_request(payload.into_inner())?;
    let block = state.content.update_block(id, draft).await?;
    Ok(web::Json(block))
}

/// Delete a content block.
#[utoipa::path(
    delete,
    path = "/api/v1/content/{id}",
    params(("id" = String, Path, description = "Block id")),
    responses(
        (status = 204, description = "Block deleted"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Admin role required", body = Error),
        (status = 404, description = "Block not found", body = Error)
    ),
    tags = ["content"],
    operation_id = "deleteContentBlock"
)]
#[delete("/content/{id}")]
pub async fn delete_content_block(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    require_admin(&state, &session).await?;
    let id = parse_uuid(&path.into_inner(), "id")?;
    state.content.delete_block(id).await?;
    Ok(HttpResponse::NoContent().finish())
}
