//! PostgreSQL-backed `ContactRepository` implementation using Diesel.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::warn;
use uuid::Uuid;

use crate::domain::contact::{ContactSubmission, PhoneNumber, SubmissionStatus};
use crate::domain::ports::{ContactRepository, ContactRepositoryError};
use crate::domain::user::EmailAddress;

use super::models::{ContactSubmissionRow, NewContactSubmissionRow};
use super::pool::{DbPool, PoolError};
use super::schema::contact_submissions;
use super::{DbErrorClass, classify_diesel_error, retry_once_on_connection};

/// Diesel-backed implementation of the `ContactRepository` port.
#[derive(Clone)]
pub struct DieselContactRepository {
    pool: DbPool,
}

impl DieselContactRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ContactRepositoryError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } | PoolError::Ping { message } => {
            ContactRepositoryError::connection(message)
        }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> ContactRepositoryError {
    match classify_diesel_error(&error) {
        DbErrorClass::Connection(message) => ContactRepositoryError::connection(message),
        DbErrorClass::Query(message) => ContactRepositoryError::query(message),
        DbErrorClass::UniqueViolation => ContactRepositoryError::query("duplicate submission"),
    }
}

fn row_to_submission(row: ContactSubmissionRow) -> Result<ContactSubmission, ContactRepositoryError> {
    let email = EmailAddress::new(&row.email)
        .map_err(|error| ContactRepositoryError::query(format!("stored email invalid: {error}")))?;
    let phone = row
        .phone
        .as_deref()
        .map(PhoneNumber::new)
        .transpose()
        .map_err(|error| ContactRepositoryError::query(format!("stored phone invalid: {error}")))?;
    let status = SubmissionStatus::parse(&row.status).unwrap_or_else(|| {
        warn!(
            value = row.status,
            submission_id = %row.id,
            "unrecognised submission status, treating as new"
        );
        SubmissionStatus::New
    });

    Ok(ContactSubmission {
        id: row.id,
        name: row.name,
        email,
        phone,
        company: row.company,
        message: row.message,
        status,
        created_at: row.created_at,
    })
}

#[async_trait]
impl ContactRepository for DieselContactRepository {
    async fn insert(&self, submission: &ContactSubmission) -> Result<(), ContactRepositoryError> {
        retry_once_on_connection(|| async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;

            let new_row = NewContactSubmissionRow {
                id: submission.id,
                name: &submission.name,
                email: submission.email.as_ref(),
                phone: submission.phone.as_ref().map(AsRef::as_ref),
                company: submission.company.as_deref(),
                message: &submission.message,
                status: submission.status.as_str(),
                created_at: submission.created_at,
            };

            diesel::insert_into(contact_submissions::table)
                .values(&new_row)
                .execute(&mut conn)
                .await
                .map(|_| ())
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn list(
        &self,
        status: Option<SubmissionStatus>,
        limit: i64,
    ) -> Result<Vec<ContactSubmission>, ContactRepositoryError> {
        retry_once_on_connection(|| async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;

            let mut query = contact_submissions::table
                .order(contact_submissions::created_at.desc())
                .limit(limit)
                .select(ContactSubmissionRow::as_select())
                .into_boxed();

            if let Some(status) = status {
                query = query.filter(contact_submissions::status.eq(status.as_str()));
            }

            let rows: Vec<ContactSubmissionRow> =
                query.load(&mut conn).await.map_err(map_diesel_error)?;

            rows.into_iter().map(row_to_submission).collect()
        })
        .await
    }

    async fn find_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<ContactSubmission>, ContactRepositoryError> {
        retry_once_on_connection(|| async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;

            let row: Option<ContactSubmissionRow> = contact_submissions::table
                .filter(contact_submissions::id.eq(id))
                .select(ContactSubmissionRow::as_select())
                .first(&mut conn)
                .await
                .optional()
                .map_err(map_diesel_error)?;

            row.map(row_to_submission).transpose()
        })
        .await
    }

    async fn set_status(
        &self,
        id: Uuid,
        status: SubmissionStatus,
    ) -> Result<Option<ContactSubmission>, ContactRepositoryError> {
        retry_once_on_connection(|| async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;

            let row: Option<ContactSubmissionRow> =
                diesel::update(contact_submissions::table.filter(contact_submissions::id.eq(id)))
                    .set(contact_submissions::status.eq(status.as_str()))
                    .returning(ContactSubmissionRow::as_returning())
                    .get_result(&mut conn)
                    .await
                    .optional()
                    .map_err(map_diesel_error)?;

            row.map(row_to_submission).transpose()
        })
        .await
    }
}
