//! Port for contact submission persistence.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::contact::{ContactSubmission, SubmissionStatus};

/// Errors raised by contact repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContactRepositoryError {
    /// Repository connection could not be established.
    #[error("contact repository connection failed: {message}")]
    Connection { message: String },

    /// Query or mutation failed during execution.
    #[error("contact repository query failed: {message}")]
    Query { message: String },
}

impl ContactRepositoryError {
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

/// Port for contact submission storage and triage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContactRepository: Send + Sync {
    /// Insert a new submission.
    async fn insert(&self, submission: &ContactSubmission) -> Result<(), ContactRepositoryError>;

    /// List submissions, newest first, optionally filtered by status.
    ///
    /// `limit` bounds the result set; adapters must not return more rows.
    async fn list(
        &self,
        status: Option<SubmissionStatus>,
        limit: i64,
    ) -> Result<Vec<ContactSubmission>, ContactRepositoryError>;

    /// Fetch a submission by id.
    async fn find_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<ContactSubmission>, ContactRepositoryError>;

    /// Update a submission's status, returning the updated record.
    /// `None` when no row matched.
    async fn set_status(
        &self,
        id: Uuid,
        status: SubmissionStatus,
    ) -> Result<Option<ContactSubmission>, ContactRepositoryError>;
}
