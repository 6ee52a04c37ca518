//! PostgreSQL-backed `ContentRepository` implementation using Diesel.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::content::{ContentBlock, PageSlug, SectionKey};
use crate::domain::ports::{ContentRepository, ContentRepositoryError};

use super::models::{ContentBlockRow, ContentBlockUpdate, NewContentBlockRow};
use super::pool::{DbPool, PoolError};
use super::schema::content_blocks;
use super::{DbErrorClass, classify_diesel_error, retry_once_on_connection};

/// Diesel-backed implementation of the `ContentRepository` port.
#[derive(Clone)]
pub struct DieselContentRepository {
    pool: DbPool,
}

impl DieselContentRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ContentRepositoryError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } | PoolError::Ping { message } => {
            ContentRepositoryError::connection(message)
        }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> ContentRepositoryError {
    match classify_diesel_error(&error) {
        DbErrorClass::Connection(message) => ContentRepositoryError::connection(message),
        DbErrorClass::Query(message) => ContentRepositoryError::query(message),
        DbErrorClass::UniqueViolation => ContentRepositoryError::query("duplicate content block"),
    }
}

fn row_to_block(row: ContentBlockRow) -> Result<ContentBlock, ContentRepositoryError> {
    let page = PageSlug::new(row.page)
        .map_err(|error| ContentRepositoryError::query(format!("stored page invalid: {error}")))?;
    let section = SectionKey::new(row.section).map_err(|error| {
        ContentRepositoryError::query(format!("stored section invalid: {error}"))
    })?;

    Ok(ContentBlock {
        id: row.id,
        page,
        section,
        title: row.title,
        body: row.body,
        position: row.position,
        updated_at: row.updated_at,
    })
}

#[async_trait]
impl ContentRepository for DieselContentRepository {
    async fn list_for_page(
        &self,
        page: &PageSlug,
    ) -> Result<Vec<ContentBlock>, ContentRepositoryError> {
        retry_once_on_connection(|| async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;

            let rows: Vec<ContentBlockRow> = content_blocks::table
                .filter(content_blocks::page.eq(page.as_ref()))
                .order(content_blocks::position.asc())
                .select(ContentBlockRow::as_select())
                .load(&mut conn)
                .await
                .map_err(map_diesel_error)?;

            rows.into_iter().map(row_to_block).collect()
        })
        .await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ContentBlock>, ContentRepositoryError> {
        retry_once_on_connection(|| async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;

            let row: Option<ContentBlockRow> = content_blocks::table
                .filter(content_blocks::id.eq(id))
                .select(ContentBlockRow::as_select())
                .first(&mut conn)
                .await
                .optional()
                .map_err(map_diesel_error)?;

            row.map(row_to_block).transpose()
        })
        .await
    }

    async fn insert(&self, block: &ContentBlock) -> Result<(), ContentRepositoryError> {
        retry_once_on_connection(|| async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;

            let new_row = NewContentBlockRow {
                id: block.id,
                page: block.page.as_ref(),
                section: block.section.as_ref(),
                title: &block.title,
                body: &block.body,
                position: block.position,
                updated_at: block.updated_at,
            };

            diesel::insert_into(content_blocks::table)
                .values(&new_row)
                .execute(&mut conn)
                .await
                .map(|_| ())
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn update(&self, block: &ContentBlock) -> Result<bool, ContentRepositoryError> {
        retry_once_on_connection(|| async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;

            let update = ContentBlockUpdate {
                page: block.page.as_ref(),
                section: block.section.as_ref(),
                title: &block.title,
                body: &block.body,
                position: block.position,
                updated_at: block.updated_at,
            };

            let updated =
                diesel::update(content_blocks::table.filter(content_blocks::id.eq(block.id)))
                    .set(&update)
                    .execute(&mut conn)
                    .await
                    .map_err(map_diesel_error)?;

            Ok(updated > 0)
        })
        .await
    }

    async fn delete(&self, id: Uuid) -> Result<Option<PageSlug>, ContentRepositoryError> {
        retry_once_on_connection(|| async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;

            // Returning the page lets the caller invalidate its cache entry.
            let page: Option<String> =
                diesel::delete(content_blocks::table.filter(content_blocks::id.eq(id)))
                    .returning(content_blocks::page)
                    .get_result(&mut conn)
                    .await
                    .optional()
                    .map_err(map_diesel_error)?;

            page.map(|raw| {
                PageSlug::new(raw).map_err(|error| {
                    ContentRepositoryError::query(format!("stored page invalid: {error}"))
                })
            })
            .transpose()
        })
        .await
    }
}
