//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the deployed schema exactly; Diesel uses
//! them for compile-time query validation and type-safe SQL generation.

diesel::table! {
    /// Registered accounts.
    ///
    /// `email` carries a unique index; the repository maps violations to a
    /// duplicate-email error.
    users (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Normalised (lowercased) unique email address.
        email -> Varchar,
        /// Human-readable display name.
        display_name -> Varchar,
        /// Whether the account holds the administrator role.
        is_admin -> Bool,
        /// Salted password digest in stored form.
        password_hash -> Varchar,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Editable marketing content, one row per page section block.
    content_blocks (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Page slug the block belongs to.
        page -> Varchar,
        /// Section key within the page.
        section -> Varchar,
        /// Block heading.
        title -> Varchar,
        /// Block body (sanitised HTML).
        body -> Text,
        /// Ordering within the page, ascending.
        position -> Int4,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Contact-form submissions awaiting triage.
    contact_submissions (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Sender name as entered.
        name -> Varchar,
        /// Sender email address.
        email -> Varchar,
        /// Optional phone number, input shape preserved.
        phone -> Nullable<Varchar>,
        /// Optional company name.
        company -> Nullable<Varchar>,
        /// Enquiry body.
        message -> Text,
        /// Triage status string.
        status -> Varchar,
        /// Submission timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Single-use OTP challenges gating account mutations.
    otp_challenges (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Account the challenge belongs to.
        user_id -> Uuid,
        /// Purpose string, one live challenge per user and purpose.
        purpose -> Varchar,
        /// Six-digit code.
        code -> Varchar,
        /// Pending mutation value, when the purpose carries one.
        payload -> Nullable<Varchar>,
        /// Expiry instant, exclusive.
        expires_at -> Timestamptz,
        /// Consumption instant, set at most once.
        consumed_at -> Nullable<Timestamptz>,
        /// Issue timestamp.
        created_at -> Timestamptz,
    }
}
