//! Contact form domain service.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::warn;
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::contact::{ContactRequest, ContactSubmission, SubmissionStatus};
use crate::domain::notifications::contact_notification;
use crate::domain::ports::{
    ContactIntake, ContactRepository, ContactRepositoryError, ContactTriage, Mailer,
    SubmissionFilter,
};
use crate::domain::user::EmailAddress;

/// Contact service implementing intake and triage.
///
/// Intake persists first and only then notifies the inbox: a delivery
/// failure must not lose the enquiry, so it is logged and the submission
/// still succeeds.
#[derive(Clone)]
pub struct ContactService<R> {
    repo: Arc<R>,
    mailer: Arc<dyn Mailer>,
    inbox: EmailAddress,
    clock: Arc<dyn Clock>,
}

impl<R> ContactService<R> {
    /// Create a new service notifying `inbox` of each submission.
    pub fn new(
        repo: Arc<R>,
        mailer: Arc<dyn Mailer>,
        inbox: EmailAddress,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repo,
            mailer,
            inbox,
            clock,
        }
    }
}

fn map_repo_error(error: ContactRepositoryError) -> Error {
    match error {
        ContactRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("contact repository unavailable: {message}"))
        }
        ContactRepositoryError::Query { message } => {
            Error::internal(format!("contact repository error: {message}"))
        }
    }
}

#[async_trait]
impl<R> ContactIntake for ContactService<R>
where
    R: ContactRepository,
{
    async fn submit(&self, request: ContactRequest) -> Result<ContactSubmission, Error> {
        let submission = ContactSubmission::from_request(request, self.clock.utc());
        self.repo.insert(&submission).await.map_err(map_repo_error)?;

        let notification = contact_notification(&submission, &self.inbox);
        if let Err(error) = self.mailer.send(&notification).await {
            warn!(
                %error,
                submission_id = %submission.id,
                "contact notification delivery failed"
            );
        }
        Ok(submission)
    }
}

#[async_trait]
impl<R> ContactTriage for ContactService<R>
where
    R: ContactRepository,
{
    async fn list(&self, filter: SubmissionFilter) -> Result<Vec<ContactSubmission>, Error> {
        self.repo
            .list(filter.status, filter.limit)
            .await
            .map_err(map_repo_error)
    }

    async fn set_status(
        &self,
        id: Uuid,
        status: SubmissionStatus,
    ) -> Result<ContactSubmission, Error> {
        self.repo
            .set_status(id, status)
            .await
            .map_err(map_repo_error)?
            .ok_or_else(|| Error::not_found("contact submission not found"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::contact::PhoneNumber;
    use crate::domain::ports::{MailerError, MockContactRepository, MockMailer};
    use mockable::DefaultClock;

    fn inbox() -> EmailAddress {
        EmailAddress::new("sales@plateworks.example").expect("valid inbox")
    }

    fn request() -> ContactRequest {
        ContactRequest::new(
            "Ada Lovelace",
            EmailAddress::new("ada@example.com").expect("email"),
            Some(PhoneNumber::new("+44 20 7946 0958").expect("phone")),
            None,
            "Quote for zinc passivation, 500 units.",
        )
        .expect("valid request")
    }

    fn service(repo: MockContactRepository, mailer: MockMailer) -> ContactService<MockContactRepository> {
        ContactService::new(
            Arc::new(repo),
            Arc::new(mailer),
            inbox(),
            Arc::new(DefaultClock),
        )
    }

    #[tokio::test]
    async fn submit_persists_then_notifies() {
        let mut repo = MockContactRepository::new();
        repo.expect_insert().times(1).return_once(|_| Ok(()));

        let mut mailer = MockMailer::new();
        mailer
            .expect_send()
            .withf(|email| email.to.as_ref() == "sales@plateworks.example")
            .times(1)
            .return_once(|_| Ok(()));

        let submission = service(repo, mailer)
            .submit(request())
            .await
            .expect("submit succeeds");
        assert_eq!(submission.status, SubmissionStatus::New);
        assert_eq!(submission.name, "Ada Lovelace");
    }

    #[tokio::test]
    async fn submit_succeeds_when_notification_fails() {
        let mut repo = MockContactRepository::new();
        repo.expect_insert().times(1).return_once(|_| Ok(()));

        let mut mailer = MockMailer::new();
        mailer
            .expect_send()
            .times(1)
            .return_once(|_| Err(MailerError::transport("relay down")));

        service(repo, mailer)
            .submit(request())
            .await
            .expect("submission survives mail failure");
    }

    #[tokio::test]
    async fn submit_fails_without_notifying_when_persistence_fails() {
        let mut repo = MockContactRepository::new();
        repo.expect_insert()
            .times(1)
            .return_once(|_| Err(ContactRepositoryError::connection("refused")));

        let mut mailer = MockMailer::new();
        mailer.expect_send().times(0);

        let error = service(repo, mailer)
            .submit(request())
            .await
            .expect_err("persistence failure");
        assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
    }

    #[tokio::test]
    async fn list_passes_filter_to_repository() {
        let mut repo = MockContactRepository::new();
        repo.expect_list()
            .withf(|status, limit| *status == Some(SubmissionStatus::New) && *limit == 25)
            .times(1)
            .return_once(|_, _| Ok(Vec::new()));

        let mailer = MockMailer::new();
        let filter = SubmissionFilter::new(Some(SubmissionStatus::New), Some(25));

        let listed = service(repo, mailer).list(filter).await.expect("list");
        assert!(listed.is_empty());
    }

    #[tokio::test]
    async fn set_status_on_missing_submission_is_not_found() {
        let mut repo = MockContactRepository::new();
        repo.expect_set_status()
            .times(1)
            .return_once(|_, _| Ok(None));

        let mailer = MockMailer::new();

        let error = service(repo, mailer)
            .set_status(Uuid::new_v4(), SubmissionStatus::Read)
            .await
            .expect_err("missing submission");
        assert_eq!(error.code(), ErrorCode::NotFound);
    }
}
