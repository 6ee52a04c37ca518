//! PostgreSQL-backed `UserRepository` implementation using Diesel.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{UserRepository, UserRepositoryError};
use crate::domain::user::{DisplayName, EmailAddress, PasswordHash, User, UserId};

use super::models::{NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;
use super::{DbErrorClass, classify_diesel_error, retry_once_on_connection};

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserRepositoryError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } | PoolError::Ping { message } => {
            UserRepositoryError::connection(message)
        }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> UserRepositoryError {
    match classify_diesel_error(&error) {
        DbErrorClass::Connection(message) => UserRepositoryError::connection(message),
        DbErrorClass::Query(message) => UserRepositoryError::query(message),
        DbErrorClass::UniqueViolation => UserRepositoryError::DuplicateEmail,
    }
}

/// Convert a database row to a domain user.
///
/// Stored values passed domain validation on the way in; a row that no
/// longer does indicates corruption and surfaces as a query error.
fn row_to_user(row: UserRow) -> Result<User, UserRepositoryError> {
    let email = EmailAddress::new(&row.email)
        .map_err(|error| UserRepositoryError::query(format!("stored email invalid: {error}")))?;
    let display_name = DisplayName::new(row.display_name).map_err(|error| {
        UserRepositoryError::query(format!("stored display name invalid: {error}"))
    })?;

    Ok(User {
        id: UserId::from_uuid(row.id),
        email,
        display_name,
        is_admin: row.is_admin,
        password_hash: PasswordHash::from_stored(row.password_hash),
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        retry_once_on_connection(|| async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;

            let row: Option<UserRow> = users::table
                .filter(users::id.eq(id.as_uuid()))
                .select(UserRow::as_select())
                .first(&mut conn)
                .await
                .optional()
                .map_err(map_diesel_error)?;

            row.map(row_to_user).transpose()
        })
        .await
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserRepositoryError> {
        retry_once_on_connection(|| async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;

            let row: Option<UserRow> = users::table
                .filter(users::email.eq(email.as_ref()))
                .select(UserRow::as_select())
                .first(&mut conn)
                .await
                .optional()
                .map_err(map_diesel_error)?;

            row.map(row_to_user).transpose()
        })
        .await
    }

    async fn list(&self) -> Result<Vec<User>, UserRepositoryError> {
        retry_once_on_connection(|| async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;

            let rows: Vec<UserRow> = users::table
                .order(users::created_at.asc())
                .select(UserRow::as_select())
                .load(&mut conn)
                .await
                .map_err(map_diesel_error)?;

            rows.into_iter().map(row_to_user).collect()
        })
        .await
    }

    async fn insert(&self, user: &User) -> Result<(), UserRepositoryError> {
        retry_once_on_connection(|| async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;

            let new_row = NewUserRow {
                id: *user.id.as_uuid(),
                email: user.email.as_ref(),
                display_name: user.display_name.as_ref(),
                is_admin: user.is_admin,
                password_hash: user.password_hash.as_stored(),
                created_at: user.created_at,
                updated_at: user.updated_at,
            };

            diesel::insert_into(users::table)
                .values(&new_row)
                .execute(&mut conn)
                .await
                .map(|_| ())
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn update_email(
        &self,
        id: &UserId,
        email: &EmailAddress,
    ) -> Result<bool, UserRepositoryError> {
        retry_once_on_connection(|| async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;

            let updated = diesel::update(users::table.filter(users::id.eq(id.as_uuid())))
                .set((users::email.eq(email.as_ref()), users::updated_at.eq(Utc::now())))
                .execute(&mut conn)
                .await
                .map_err(map_diesel_error)?;

            Ok(updated > 0)
        })
        .await
    }

    async fn update_password(
        &self,
        id: &UserId,
        password_hash: &PasswordHash,
    ) -> Result<bool, UserRepositoryError> {
        retry_once_on_connection(|| async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;

            let updated = diesel::update(users::table.filter(users::id.eq(id.as_uuid())))
                .set((
                    users::password_hash.eq(password_hash.as_stored()),
                    users::updated_at.eq(Utc::now()),
                ))
                .execute(&mut conn)
                .await
                .map_err(map_diesel_error)?;

            Ok(updated > 0)
        })
        .await
    }

    async fn delete(&self, id: &UserId) -> Result<bool, UserRepositoryError> {
        retry_once_on_connection(|| async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;

            let deleted = diesel::delete(users::table.filter(users::id.eq(id.as_uuid())))
                .execute(&mut conn)
                .await
                .map_err(map_diesel_error)?;

            Ok(deleted > 0)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let repo_err = map_pool_error(PoolError::checkout("connection refused"));

        assert!(matches!(repo_err, UserRepositoryError::Connection { .. }));
        assert!(repo_err.to_string().contains("connection refused"));
    }

    #[rstest]
    fn unique_violation_maps_to_duplicate_email() {
        let diesel_err = diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::UniqueViolation,
            Box::new("duplicate key value".to_owned()),
        );

        assert_eq!(
            map_diesel_error(diesel_err),
            UserRepositoryError::DuplicateEmail
        );
    }

    #[rstest]
    fn not_found_maps_to_query_error() {
        let repo_err = map_diesel_error(diesel::result::Error::NotFound);
        assert!(matches!(repo_err, UserRepositoryError::Query { .. }));
    }

    #[rstest]
    fn row_converts_to_domain_user() {
        let now = Utc::now();
        let row = UserRow {
            id: uuid::Uuid::new_v4(),
            email: "ada@example.com".to_owned(),
            display_name: "Ada".to_owned(),
            is_admin: true,
            password_hash: "ab$cd".to_owned(),
            created_at: now,
            updated_at: now,
        };

        let user = row_to_user(row).expect("valid row");
        assert_eq!(user.email.as_ref(), "ada@example.com");
        assert!(user.is_admin);
        assert_eq!(user.password_hash.as_stored(), "ab$cd");
    }

    #[rstest]
    fn corrupt_email_surfaces_as_query_error() {
        let now = Utc::now();
        let row = UserRow {
            id: uuid::Uuid::new_v4(),
            email: "not-an-email".to_owned(),
            display_name: "Ada".to_owned(),
            is_admin: false,
            password_hash: "ab$cd".to_owned(),
            created_at: now,
            updated_at: now,
        };

        let error = row_to_user(row).expect_err("corrupt row");
        assert!(matches!(error, UserRepositoryError::Query { .. }));
    }
}
