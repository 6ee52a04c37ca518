//! In-memory adapters for integration tests.
//!
//! These back the domain services with plain `Mutex`-guarded collections so
//! end-to-end tests exercise real service logic without PostgreSQL or an
//! SMTP relay. Enabled via the `test-support` feature.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::contact::{ContactSubmission, SubmissionStatus};
use crate::domain::content::{ContentBlock, PageSlug};
use crate::domain::otp::{OtpChallenge, OtpPurpose};
use crate::domain::ports::{
    ContactRepository, ContactRepositoryError, ContentRepository, ContentRepositoryError, Mailer,
    MailerError, OtpRepository, OtpRepositoryError, UserRepository, UserRepositoryError,
};
use crate::domain::user::{EmailAddress, PasswordHash, User, UserId};

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// User store backed by a `Vec`, enforcing email uniqueness.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<Vec<User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store, bypassing uniqueness checks.
    pub fn with_users(users: Vec<User>) -> Self {
        Self {
            users: Mutex::new(users),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        Ok(lock(&self.users).iter().find(|u| &u.id == id).cloned())
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserRepositoryError> {
        Ok(lock(&self.users).iter().find(|u| &u.email == email).cloned())
    }

    async fn list(&self) -> Result<Vec<User>, UserRepositoryError> {
        let mut users = lock(&self.users).clone();
        users.sort_by_key(|u| u.created_at);
        Ok(users)
    }

    async fn insert(&self, user: &User) -> Result<(), UserRepositoryError> {
        let mut users = lock(&self.users);
        if users.iter().any(|u| u.email == user.email) {
            return Err(UserRepositoryError::DuplicateEmail);
        }
        users.push(user.clone());
        Ok(())
    }

    async fn update_email(
        &self,
        id: &UserId,
        email: &EmailAddress,
    ) -> Result<bool, UserRepositoryError> {
        let mut users = lock(&self.users);
        if users.iter().any(|u| &u.email == email && &u.id != id) {
            return Err(UserRepositoryError::DuplicateEmail);
        }
        match users.iter_mut().find(|u| &u.id == id) {
            Some(user) => {
                user.email = email.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn update_password(
        &self,
        id: &UserId,
        password_hash: &PasswordHash,
    ) -> Result<bool, UserRepositoryError> {
        let mut users = lock(&self.users);
        match users.iter_mut().find(|u| &u.id == id) {
            Some(user) => {
                user.password_hash = password_hash.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: &UserId) -> Result<bool, UserRepositoryError> {
        let mut users = lock(&self.users);
        let before = users.len();
        users.retain(|u| &u.id != id);
        Ok(users.len() < before)
    }
}

/// Content block store backed by a `Vec`.
#[derive(Default)]
pub struct InMemoryContentRepository {
    blocks: Mutex<Vec<ContentBlock>>,
}

impl InMemoryContentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blocks(blocks: Vec<ContentBlock>) -> Self {
        Self {
            blocks: Mutex::new(blocks),
        }
    }
}

#[async_trait]
impl ContentRepository for InMemoryContentRepository {
    async fn list_for_page(
        &self,
        page: &PageSlug,
    ) -> Result<Vec<ContentBlock>, ContentRepositoryError> {
        let mut blocks: Vec<_> = lock(&self.blocks)
            .iter()
            .filter(|b| &b.page == page)
            .cloned()
            .collect();
        blocks.sort_by_key(|b| b.position);
        Ok(blocks)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ContentBlock>, ContentRepositoryError> {
        Ok(lock(&self.blocks).iter().find(|b| b.id == id).cloned())
    }

    async fn insert(&self, block: &ContentBlock) -> Result<(), ContentRepositoryError> {
        lock(&self.blocks).push(block.clone());
        Ok(())
    }

    async fn update(&self, block: &ContentBlock) -> Result<bool, ContentRepositoryError> {
        let mut blocks = lock(&self.blocks);
        match blocks.iter_mut().find(|b| b.id == block.id) {
            Some(stored) => {
                *stored = block.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<Option<PageSlug>, ContentRepositoryError> {
        let mut blocks = lock(&self.blocks);
        let page = blocks.iter().find(|b| b.id == id).map(|b| b.page.clone());
        blocks.retain(|b| b.id != id);
        Ok(page)
    }
}

/// Contact submission store backed by a `Vec`.
#[derive(Default)]
pub struct InMemoryContactRepository {
    submissions: Mutex<Vec<ContactSubmission>>,
}

impl InMemoryContactRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContactRepository for InMemoryContactRepository {
    async fn insert(&self, submission: &ContactSubmission) -> Result<(), ContactRepositoryError> {
        lock(&self.submissions).push(submission.clone());
        Ok(())
    }

    async fn list(
        &self,
        status: Option<SubmissionStatus>,
        limit: i64,
    ) -> Result<Vec<ContactSubmission>, ContactRepositoryError> {
        let mut submissions: Vec<_> = lock(&self.submissions)
            .iter()
            .filter(|s| status.is_none_or(|wanted| s.status == wanted))
            .cloned()
            .collect();
        submissions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        submissions.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(submissions)
    }

    async fn find_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<ContactSubmission>, ContactRepositoryError> {
        Ok(lock(&self.submissions).iter().find(|s| s.id == id).cloned())
    }

    async fn set_status(
        &self,
        id: Uuid,
        status: SubmissionStatus,
    ) -> Result<Option<ContactSubmission>, ContactRepositoryError> {
        let mut submissions = lock(&self.submissions);
        match submissions.iter_mut().find(|s| s.id == id) {
            Some(submission) => {
                submission.status = status;
                Ok(Some(submission.clone()))
            }
            None => Ok(None),
        }
    }
}

/// OTP challenge store backed by a `Vec`.
#[derive(Default)]
pub struct InMemoryOtpRepository {
    challenges: Mutex<Vec<OtpChallenge>>,
}

impl InMemoryOtpRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// The newest stored challenge, consumed or not. Lets tests read the
    /// issued code without scraping email bodies.
    pub fn latest(&self) -> Option<OtpChallenge> {
        lock(&self.challenges)
            .iter()
            .max_by_key(|c| c.created_at)
            .cloned()
    }
}

#[async_trait]
impl OtpRepository for InMemoryOtpRepository {
    async fn store(&self, challenge: &OtpChallenge) -> Result<(), OtpRepositoryError> {
        let mut challenges = lock(&self.challenges);
        challenges.retain(|c| {
            !(c.user_id == challenge.user_id
                && c.purpose == challenge.purpose
                && c.consumed_at.is_none())
        });
        challenges.push(challenge.clone());
        Ok(())
    }

    async fn find_latest(
        &self,
        user_id: &UserId,
        purpose: OtpPurpose,
    ) -> Result<Option<OtpChallenge>, OtpRepositoryError> {
        Ok(lock(&self.challenges)
            .iter()
            .filter(|c| &c.user_id == user_id && c.purpose == purpose && c.consumed_at.is_none())
            .max_by_key(|c| c.created_at)
            .cloned())
    }

    async fn mark_consumed(&self, id: Uuid) -> Result<bool, OtpRepositoryError> {
        let mut challenges = lock(&self.challenges);
        match challenges
            .iter_mut()
            .find(|c| c.id == id && c.consumed_at.is_none())
        {
            Some(challenge) => {
                challenge.consumed_at = Some(chrono::Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Mailer that records messages instead of sending them.
///
/// Flip `fail_sends` to simulate an unreachable relay.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<crate::domain::ports::OutboundEmail>>,
    fail_sends: AtomicBool,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<crate::domain::ports::OutboundEmail> {
        lock(&self.sent).clone()
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail_sends.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(
        &self,
        email: &crate::domain::ports::OutboundEmail,
    ) -> Result<(), MailerError> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(MailerError::transport("relay unreachable"));
        }
        lock(&self.sent).push(email.clone());
        Ok(())
    }
}
