//! Driving ports for page content.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::content::{ContentBlock, ContentBlockDraft, PageSlug};

/// Read side of the content API, backed by the result cache.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentQuery: Send + Sync {
    /// Blocks for a public page, ordered by ascending position.
    async fn page_content(&self, page: &PageSlug) -> Result<Vec<ContentBlock>, Error>;
}

/// Write side of the content API (admin only at the HTTP boundary).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentCommand: Send + Sync {
    /// Create a block from a validated draft.
    async fn create_block(&self, draft: ContentBlockDraft) -> Result<ContentBlock, Error>;

    /// Replace an existing block's fields from a validated draft.
    async fn update_block(&self, id: Uuid, draft: ContentBlockDraft)
    -> Result<ContentBlock, Error>;

    /// Delete a block.
    async fn delete_block(&self, id: Uuid) -> Result<(), Error>;
}
