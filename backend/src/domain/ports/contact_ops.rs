//! Driving ports for contact submissions.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::contact::{ContactRequest, ContactSubmission, SubmissionStatus};

/// Default number of submissions returned by a triage listing.
pub const DEFAULT_LIST_LIMIT: i64 = 50;
/// Hard ceiling on a triage listing.
pub const MAX_LIST_LIMIT: i64 = 200;

/// Filter for triage listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionFilter {
    pub status: Option<SubmissionStatus>,
    pub limit: i64,
}

impl SubmissionFilter {
    /// Build a filter, clamping the limit into `1..=MAX_LIST_LIMIT`.
    pub fn new(status: Option<SubmissionStatus>, limit: Option<i64>) -> Self {
        let limit = limit
            .unwrap_or(DEFAULT_LIST_LIMIT)
            .clamp(1, MAX_LIST_LIMIT);
        Self { status, limit }
    }
}

impl Default for SubmissionFilter {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Public intake side of the contact form.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContactIntake: Send + Sync {
    /// Persist a validated submission and notify the configured inbox.
    async fn submit(&self, request: ContactRequest) -> Result<ContactSubmission, Error>;
}

/// Admin triage side of the contact form.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContactTriage: Send + Sync {
    /// List submissions, newest first.
    async fn list(&self, filter: SubmissionFilter) -> Result<Vec<ContactSubmission>, Error>;

    /// Move a submission to a new triage status.
    async fn set_status(
        &self,
        id: Uuid,
        status: SubmissionStatus,
    ) -> Result<ContactSubmission, Error>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, DEFAULT_LIST_LIMIT)]
    #[case(Some(10), 10)]
    #[case(Some(0), 1)]
    #[case(Some(-5), 1)]
    #[case(Some(10_000), MAX_LIST_LIMIT)]
    fn filter_clamps_limit(#[case] requested: Option<i64>, #[case] expected: i64) {
        assert_eq!(SubmissionFilter::new(None, requested).limit, expected);
    }
}
