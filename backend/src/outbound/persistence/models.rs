//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Conversions to and from domain types
//! live in the repository adapters.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{contact_submissions, content_blocks, otp_challenges, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub is_admin: bool,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub email: &'a str,
    pub display_name: &'a str,
    pub is_admin: bool,
    pub password_hash: &'a str,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Content block models
// ---------------------------------------------------------------------------

/// Row struct for reading from the content_blocks table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = content_blocks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ContentBlockRow {
    pub id: Uuid,
    pub page: String,
    pub section: String,
    pub title: String,
    pub body: String,
    pub position: i32,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for creating new content block records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = content_blocks)]
pub(crate) struct NewContentBlockRow<'a> {
    pub id: Uuid,
    pub page: &'a str,
    pub section: &'a str,
    pub title: &'a str,
    pub body: &'a str,
    pub position: i32,
    pub updated_at: DateTime<Utc>,
}

/// Changeset struct for replacing a content block's editable fields.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = content_blocks)]
pub(crate) struct ContentBlockUpdate<'a> {
    pub page: &'a str,
    pub section: &'a str,
    pub title: &'a str,
    pub body: &'a str,
    pub position: i32,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Contact submission models
// ---------------------------------------------------------------------------

/// Row struct for reading from the contact_submissions table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = contact_submissions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ContactSubmissionRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub message: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for creating new contact submission records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = contact_submissions)]
pub(crate) struct NewContactSubmissionRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub email: &'a str,
    pub phone: Option<&'a str>,
    pub company: Option<&'a str>,
    pub message: &'a str,
    pub status: &'a str,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// OTP challenge models
// ---------------------------------------------------------------------------

/// Row struct for reading from the otp_challenges table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = otp_challenges)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct OtpChallengeRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub purpose: String,
    pub code: String,
    pub payload: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub consumed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for creating new OTP challenge records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = otp_challenges)]
pub(crate) struct NewOtpChallengeRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub purpose: &'a str,
    pub code: &'a str,
    pub payload: Option<&'a str>,
    pub expires_at: DateTime<Utc>,
    pub consumed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
