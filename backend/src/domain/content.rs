//! Editable marketing content, one block per page section.

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Maximum length accepted for a page or section slug.
pub const SLUG_MAX: usize = 64;
/// Maximum length accepted for a block title.
pub const TITLE_MAX: usize = 160;
/// Maximum length accepted for a block body (64 KiB).
pub const BODY_MAX: usize = 64 * 1024;

/// Validation errors for content blocks.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContentValidationError {
    #[error("slug must be non-empty lowercase kebab-case, at most {max} characters")]
    InvalidSlug { max: usize },
    #[error("title must not be empty")]
    EmptyTitle,
    #[error("title must be at most {max} characters")]
    TitleTooLong { max: usize },
    #[error("body must be at most {max} characters")]
    BodyTooLong { max: usize },
}

static SLUG_RE: OnceLock<Regex> = OnceLock::new();

fn slug_regex() -> &'static Regex {
    SLUG_RE.get_or_init(|| {
        let pattern = "^[a-z0-9]+(-[a-z0-9]+)*$";
        Regex::new(pattern).unwrap_or_else(|error| panic!("slug regex failed to compile: {error}"))
    })
}

fn validate_slug(raw: &str) -> Result<(), ContentValidationError> {
    if raw.is_empty() || raw.chars().count() > SLUG_MAX || !slug_regex().is_match(raw) {
        return Err(ContentValidationError::InvalidSlug { max: SLUG_MAX });
    }
    Ok(())
}

/// Identifier of a public page, e.g. `zinc-plating` or `aerospace`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, example = "zinc-plating")]
pub struct PageSlug(String);

impl PageSlug {
    /// Validate and construct a [`PageSlug`].
    pub fn new(raw: impl Into<String>) -> Result<Self, ContentValidationError> {
        let candidate = raw.into();
        validate_slug(&candidate)?;
        Ok(Self(candidate))
    }
}

impl AsRef<str> for PageSlug {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for PageSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<PageSlug> for String {
    fn from(value: PageSlug) -> Self {
        value.0
    }
}

impl TryFrom<String> for PageSlug {
    type Error = ContentValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Identifier of a section within a page, e.g. `hero` or `process-steps`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, example = "hero")]
pub struct SectionKey(String);

impl SectionKey {
    /// Validate and construct a [`SectionKey`].
    pub fn new(raw: impl Into<String>) -> Result<Self, ContentValidationError> {
        let candidate = raw.into();
        validate_slug(&candidate)?;
        Ok(Self(candidate))
    }
}

impl AsRef<str> for SectionKey {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for SectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<SectionKey> for String {
    fn from(value: SectionKey) -> Self {
        value.0
    }
}

impl TryFrom<String> for SectionKey {
    type Error = ContentValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Validated fields for creating or replacing a content block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentBlockDraft {
    pub page: PageSlug,
    pub section: SectionKey,
    pub title: String,
    pub body: String,
    pub position: i32,
}

impl ContentBlockDraft {
    /// Validate title and body bounds; slugs carry their own validation.
    pub fn new(
        page: PageSlug,
        section: SectionKey,
        title: impl Into<String>,
        body: impl Into<String>,
        position: i32,
    ) -> Result<Self, ContentValidationError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(ContentValidationError::EmptyTitle);
        }
        if title.chars().count() > TITLE_MAX {
            return Err(ContentValidationError::TitleTooLong { max: TITLE_MAX });
        }
        let body = body.into();
        if body.chars().count() > BODY_MAX {
            return Err(ContentValidationError::BodyTooLong { max: BODY_MAX });
        }
        Ok(Self {
            page,
            section,
            title,
            body,
            position,
        })
    }
}

/// Stored content block rendered by the public site.
///
/// Blocks for one page are rendered in ascending `position` order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContentBlock {
    pub id: Uuid,
    pub page: PageSlug,
    pub section: SectionKey,
    pub title: String,
    pub body: String,
    pub position: i32,
    pub updated_at: DateTime<Utc>,
}

impl ContentBlock {
    /// Build a fresh block from a validated draft.
    pub fn from_draft(draft: ContentBlockDraft, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            page: draft.page,
            section: draft.section,
            title: draft.title,
            body: draft.body,
            position: draft.position,
            updated_at: now,
        }
    }

    /// Replace editable fields from a draft, refreshing `updated_at`.
    pub fn apply_draft(&mut self, draft: ContentBlockDraft, now: DateTime<Utc>) {
        self.page = draft.page;
        self.section = draft.section;
        self.title = draft.title;
        self.body = draft.body;
        self.position = draft.position;
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("zinc-plating")]
    #[case("hero")]
    #[case("process-steps-2")]
    fn valid_slugs_are_accepted(#[case] raw: &str) {
        PageSlug::new(raw).expect("valid slug");
        SectionKey::new(raw).expect("valid key");
    }

    #[rstest]
    #[case("")]
    #[case("Zinc-Plating")]
    #[case("zinc plating")]
    #[case("-leading")]
    #[case("trailing-")]
    #[case("double--dash")]
    fn invalid_slugs_are_rejected(#[case] raw: &str) {
        assert!(PageSlug::new(raw).is_err(), "{raw:?} should be invalid");
    }

    #[test]
    fn overlong_slug_is_rejected() {
        let raw = "a".repeat(SLUG_MAX + 1);
        assert!(PageSlug::new(raw).is_err());
    }

    #[test]
    fn draft_rejects_blank_title() {
        let result = ContentBlockDraft::new(
            PageSlug::new("home").expect("slug"),
            SectionKey::new("hero").expect("key"),
            "  ",
            "<p>body</p>",
            0,
        );
        assert_eq!(result, Err(ContentValidationError::EmptyTitle));
    }

    #[test]
    fn draft_rejects_oversized_body() {
        let result = ContentBlockDraft::new(
            PageSlug::new("home").expect("slug"),
            SectionKey::new("hero").expect("key"),
            "Hero",
            "x".repeat(BODY_MAX + 1),
            0,
        );
        assert_eq!(
            result,
            Err(ContentValidationError::BodyTooLong { max: BODY_MAX })
        );
    }

    #[test]
    fn apply_draft_replaces_fields_and_touches_timestamp() {
        let draft = ContentBlockDraft::new(
            PageSlug::new("home").expect("slug"),
            SectionKey::new("hero").expect("key"),
            "Hero",
            "<p>old</p>",
            0,
        )
        .expect("draft");
        let created = Utc::now();
        let mut block = ContentBlock::from_draft(draft, created);

        let replacement = ContentBlockDraft::new(
            PageSlug::new("home").expect("slug"),
            SectionKey::new("hero").expect("key"),
            "Hero v2",
            "<p>new</p>",
            3,
        )
        .expect("draft");
        let later = created + chrono::Duration::seconds(5);
        block.apply_draft(replacement, later);

        assert_eq!(block.title, "Hero v2");
        assert_eq!(block.position, 3);
        assert_eq!(block.updated_at, later);
    }
}
