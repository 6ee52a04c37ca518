//! Shared validation helpers for inbound HTTP adapters.
//!
//! Domain value types carry their own rules; these helpers wrap their
//! failures into `400` payloads with field-level detail.

use std::fmt::Display;

use serde_json::json;
use uuid::Uuid;

use crate::domain::Error;

/// `400` for a request body missing a required field.
pub(crate) fn missing_field_error(field: &'static str) -> Error {
    Error::invalid_request(format!("missing required field: {field}")).with_details(json!({
        "field": field,
        "code": "missing_field",
    }))
}

/// `400` for a field value that failed domain validation.
pub(crate) fn invalid_field_error(field: &'static str, error: impl Display) -> Error {
    Error::invalid_request(error.to_string()).with_details(json!({
        "field": field,
        "code": "invalid_value",
    }))
}

/// Parse a path segment as a UUID.
pub(crate) fn parse_uuid(value: &str, field: &'static str) -> Result<Uuid, Error> {
    Uuid::parse_str(value).map_err(|_| {
        Error::invalid_request(format!("{field} must be a valid UUID")).with_details(json!({
            "field": field,
            "value": value,
            "code": "invalid_uuid",
        }))
    })
}
