//! Shared validation helpers for inbound HTTP adapters.
//!
//! Domain value constructors return typed validation errors; these helpers
//! turn them into `invalid_request` responses with a structured `details`
//! payload naming the offending field.

use serde_json::json;

use crate::domain::{DomainError, VoteDirection, VoteValidationError};

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(self) -> &'static str {
        self.0
    }
}

/// Map a typed domain validation error onto a 400 with field details.
pub(crate) fn invalid_field(field: FieldName, error: impl std::fmt::Display) -> DomainError {
    DomainError::invalid_request(error.to_string()).with_details(json!({
        "field": field.as_str(),
    }))
}

/// Parse a path or body identifier through its validating constructor.
pub(crate) fn parse_id<T>(field: FieldName, raw: String) -> Result<T, DomainError>
where
    T: TryFrom<String>,
    T::Error: std::fmt::Display,
{
    T::try_from(raw).map_err(|error| invalid_field(field, error))
}

/// Parse a wire integer into a [`VoteDirection`].
pub(crate) fn parse_direction(field: FieldName, raw: i64) -> Result<VoteDirection, DomainError> {
    VoteDirection::try_from(raw).map_err(|error: VoteValidationError| invalid_field(field, error))
}
