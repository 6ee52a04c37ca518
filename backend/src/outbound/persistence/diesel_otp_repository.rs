//! PostgreSQL-backed `OtpRepository` implementation using Diesel.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::otp::{OtpChallenge, OtpCode, OtpPurpose};
use crate::domain::ports::{OtpRepository, OtpRepositoryError};
use crate::domain::user::UserId;

use super::models::{NewOtpChallengeRow, OtpChallengeRow};
use super::pool::{DbPool, PoolError};
use super::schema::otp_challenges;
use super::{DbErrorClass, classify_diesel_error, retry_once_on_connection};

/// Diesel-backed implementation of the `OtpRepository` port.
///
/// Storing a challenge deletes any unconsumed predecessor for the same user
/// and purpose, so at most one code is ever live per mutation.
#[derive(Clone)]
pub struct DieselOtpRepository {
    pool: DbPool,
}

impl DieselOtpRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> OtpRepositoryError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } | PoolError::Ping { message } => {
            OtpRepositoryError::connection(message)
        }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> OtpRepositoryError {
    match classify_diesel_error(&error) {
        DbErrorClass::Connection(message) => OtpRepositoryError::connection(message),
        DbErrorClass::Query(message) => OtpRepositoryError::query(message),
        DbErrorClass::UniqueViolation => OtpRepositoryError::query("duplicate challenge"),
    }
}

fn row_to_challenge(row: OtpChallengeRow) -> Result<OtpChallenge, OtpRepositoryError> {
    let purpose = OtpPurpose::parse(&row.purpose).ok_or_else(|| {
        OtpRepositoryError::query(format!("stored purpose invalid: {}", row.purpose))
    })?;
    let code = OtpCode::parse(&row.code)
        .ok_or_else(|| OtpRepositoryError::query("stored code invalid"))?;

    Ok(OtpChallenge {
        id: row.id,
        user_id: UserId::from_uuid(row.user_id),
        purpose,
        code,
        payload: row.payload,
        expires_at: row.expires_at,
        consumed_at: row.consumed_at,
        created_at: row.created_at,
    })
}

#[async_trait]
impl OtpRepository for DieselOtpRepository {
    async fn store(&self, challenge: &OtpChallenge) -> Result<(), OtpRepositoryError> {
        retry_once_on_connection(|| async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;

            // Supersede any live predecessor before inserting.
            diesel::delete(
                otp_challenges::table
                    .filter(otp_challenges::user_id.eq(challenge.user_id.as_uuid()))
                    .filter(otp_challenges::purpose.eq(challenge.purpose.as_str()))
                    .filter(otp_challenges::consumed_at.is_null()),
            )
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

            let new_row = NewOtpChallengeRow {
                id: challenge.id,
                user_id: *challenge.user_id.as_uuid(),
                purpose: challenge.purpose.as_str(),
                code: challenge.code.as_str(),
                payload: challenge.payload.as_deref(),
                expires_at: challenge.expires_at,
                consumed_at: challenge.consumed_at,
                created_at: challenge.created_at,
            };

            diesel::insert_into(otp_challenges::table)
                .values(&new_row)
                .execute(&mut conn)
                .await
                .map(|_| ())
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn find_latest(
        &self,
        user_id: &UserId,
        purpose: OtpPurpose,
    ) -> Result<Option<OtpChallenge>, OtpRepositoryError> {
        retry_once_on_connection(|| async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;

            let row: Option<OtpChallengeRow> = otp_challenges::table
                .filter(otp_challenges::user_id.eq(user_id.as_uuid()))
                .filter(otp_challenges::purpose.eq(purpose.as_str()))
                .filter(otp_challenges::consumed_at.is_null())
                .order(otp_challenges::created_at.desc())
                .select(OtpChallengeRow::as_select())
                .first(&mut conn)
                .await
                .optional()
                .map_err(map_diesel_error)?;

            row.map(row_to_challenge).transpose()
        })
        .await
    }

    async fn mark_consumed(&self, id: Uuid) -> Result<bool, OtpRepositoryError> {
        retry_once_on_connection(|| async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;

            // Guarding on consumed_at keeps consumption single-shot even
            // under concurrent confirmations.
            let updated = diesel::update(
                otp_challenges::table
                    .filter(otp_challenges::id.eq(id))
                    .filter(otp_challenges::consumed_at.is_null()),
            )
            .set(otp_challenges::consumed_at.eq(diesel::dsl::now))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

            Ok(updated > 0)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rstest::rstest;

    fn row(purpose: &str, code: &str) -> OtpChallengeRow {
        OtpChallengeRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            purpose: purpose.to_owned(),
            code: code.to_owned(),
            payload: Some("new@example.com".to_owned()),
            expires_at: Utc::now(),
            consumed_at: None,
            created_at: Utc::now(),
        }
    }

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let repo_err = map_pool_error(PoolError::checkout("timed out"));
        assert!(matches!(repo_err, OtpRepositoryError::Connection { .. }));
    }

    #[rstest]
    fn row_converts_to_domain_challenge() {
        let challenge = row_to_challenge(row("email_change", "123456")).expect("valid row");
        assert_eq!(challenge.purpose, OtpPurpose::EmailChange);
        assert_eq!(challenge.code.as_str(), "123456");
        assert_eq!(challenge.payload.as_deref(), Some("new@example.com"));
    }

    #[rstest]
    #[case("mystery_purpose", "123456")]
    #[case("email_change", "12345")]
    fn corrupt_row_surfaces_as_query_error(#[case] purpose: &str, #[case] code: &str) {
        let error = row_to_challenge(row(purpose, code)).expect_err("corrupt row");
        assert!(matches!(error, OtpRepositoryError::Query { .. }));
    }
}
