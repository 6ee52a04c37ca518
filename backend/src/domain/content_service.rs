//! Content domain service: cached reads, invalidating writes.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mockable::Clock;
use tracing::warn;
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::content::{ContentBlock, ContentBlockDraft, PageSlug};
use crate::domain::ports::{
    ContentCommand, ContentQuery, ContentRepository, ContentRepositoryError, ResultCache,
};

/// Cache key for a page's block list.
fn page_cache_key(page: &PageSlug) -> String {
    format!("content:{page}")
}

/// Content service implementing the driving ports.
///
/// Reads go through the result cache with a fixed TTL; every write
/// invalidates the affected page so the public site never renders a
/// mutated page from a stale entry.
#[derive(Clone)]
pub struct ContentService<R> {
    repo: Arc<R>,
    cache: Arc<dyn ResultCache>,
    cache_ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<R> ContentService<R> {
    /// Create a new service.
    pub fn new(
        repo: Arc<R>,
        cache: Arc<dyn ResultCache>,
        cache_ttl: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repo,
            cache,
            cache_ttl,
            clock,
        }
    }
}

fn map_repo_error(error: ContentRepositoryError) -> Error {
    match error {
        ContentRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("content repository unavailable: {message}"))
        }
        ContentRepositoryError::Query { message } => {
            Error::internal(format!("content repository error: {message}"))
        }
    }
}

impl<R> ContentService<R>
where
    R: ContentRepository,
{
    fn cached_page(&self, key: &str) -> Option<Vec<ContentBlock>> {
        let value = self.cache.get(key)?;
        match serde_json::from_value(value) {
            Ok(blocks) => Some(blocks),
            Err(error) => {
                // A shape mismatch means a stale deployment wrote the entry.
                warn!(%error, key, "discarding undecodable cache entry");
                self.cache.invalidate(key);
                None
            }
        }
    }

    fn store_page(&self, key: &str, blocks: &[ContentBlock]) {
        match serde_json::to_value(blocks) {
            Ok(value) => self.cache.put(key, value, self.cache_ttl),
            Err(error) => warn!(%error, key, "failed to serialize page for caching"),
        }
    }
}

#[async_trait]
impl<R> ContentQuery for ContentService<R>
where
    R: ContentRepository,
{
    async fn page_content(&self, page: &PageSlug) -> Result<Vec<ContentBlock>, Error> {
        let key = page_cache_key(page);
        if let Some(blocks) = self.cached_page(&key) {
            return Ok(blocks);
        }

        let blocks = self
            .repo
            .list_for_page(page)
            .await
            .map_err(map_repo_error)?;
        self.store_page(&key, &blocks);
        Ok(blocks)
    }
}

#[async_trait]
impl<R> ContentCommand for ContentService<R>
where
    R: ContentRepository,
{
    async fn create_block(&self, draft: ContentBlockDraft) -> Result<ContentBlock, Error> {
        let block = ContentBlock::from_draft(draft, self.clock.utc());
        self.repo.insert(&block).await.map_err(map_repo_error)?;
        self.cache.invalidate(&page_cache_key(&block.page));
        Ok(block)
    }

    async fn update_block(
        &self,
        id: Uuid,
        draft: ContentBlockDraft,
    ) -> Result<ContentBlock, Error> {
        let mut block = self
            .repo
            .find_by_id(id)
            .await
            .map_err(map_repo_error)?
            .ok_or_else(|| Error::not_found("content block not found"))?;

        let old_page = block.page.clone();
        block.apply_draft(draft, self.clock.utc());

        let updated = self.repo.update(&block).await.map_err(map_repo_error)?;
        if !updated {
            return Err(Error::not_found("content block not found"));
        }

        // The block may have moved between pages; drop both entries.
        self.cache.invalidate(&page_cache_key(&old_page));
        if block.page != old_page {
            self.cache.invalidate(&page_cache_key(&block.page));
        }
        Ok(block)
    }

    async fn delete_block(&self, id: Uuid) -> Result<(), Error> {
        let page = self
            .repo
            .delete(id)
            .await
            .map_err(map_repo_error)?
            .ok_or_else(|| Error::not_found("content block not found"))?;
        self.cache.invalidate(&page_cache_key(&page));
        Ok(())
    }
}
