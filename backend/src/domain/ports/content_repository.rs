//! Port for content block persistence.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::content::{ContentBlock, PageSlug};

/// Errors raised by content repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContentRepositoryError {
    /// Repository connection could not be established.
    #[error("content repository connection failed: {message}")]
    Connection { message: String },

    /// Query or mutation failed during execution.
    #[error("content repository query failed: {message}")]
    Query { message: String },
}

impl ContentRepositoryError {
    /// Create a connection error with the given message.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a query error with the given message.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Port for content block storage and retrieval.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// List blocks for a page ordered by ascending position.
    async fn list_for_page(
        &self,
        page: &PageSlug,
    ) -> Result<Vec<ContentBlock>, ContentRepositoryError>;

    /// Fetch a block by id.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ContentBlock>, ContentRepositoryError>;

    /// Insert a new block.
    async fn insert(&self, block: &ContentBlock) -> Result<(), ContentRepositoryError>;

    /// Replace an existing block. Returns `false` when no row matched.
    async fn update(&self, block: &ContentBlock) -> Result<bool, ContentRepositoryError>;

    /// Delete a block, returning the page it belonged to so callers can
    /// invalidate cached page content. `None` when no row matched.
    async fn delete(&self, id: Uuid) -> Result<Option<PageSlug>, ContentRepositoryError>;
}
