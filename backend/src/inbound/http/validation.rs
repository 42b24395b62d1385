//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every rejection becomes `invalid_request` with a `details` object naming
//! the offending `field` and a stable `code`.

use std::fmt::Display;

use serde_json::json;
use uuid::Uuid;

use crate::domain::{
    CredentialsValidationError, Error, FeedQueryError, PostValidationError, UserValidationError,
};

/// Validation error codes raised by the HTTP layer itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    InvalidUuid,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidUuid => "invalid_uuid",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &str {
        self.0
    }
}

/// Domain validation failures that know which request field they concern.
pub(crate) trait FieldValidation: Display {
    fn field(&self) -> &'static str;
    fn code(&self) -> &'static str;
}

macro_rules! field_validation {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl FieldValidation for $ty {
                fn field(&self) -> &'static str {
                    <$ty>::field(self)
                }

                fn code(&self) -> &'static str {
                    <$ty>::code(self)
                }
            }
        )+
    };
}

field_validation!(
    CredentialsValidationError,
    UserValidationError,
    PostValidationError,
    FeedQueryError,
);

/// Translate a domain validation failure into a client error.
pub(crate) fn invalid_field(err: &impl FieldValidation) -> Error {
    Error::invalid_request(err.to_string()).with_details(json!({
        "field": err.field(),
        "code": err.code(),
    }))
}

pub(crate) fn invalid_uuid_error(field: FieldName, value: &str) -> Error {
    let field = field.as_str();
    Error::invalid_request(format!("{field} must be a valid UUID")).with_details(json!({
        "field": field,
        "value": value,
        "code": ErrorCode::InvalidUuid.as_str(),
    }))
}

pub(crate) fn parse_uuid(value: &str, field: FieldName) -> Result<Uuid, Error> {
    Uuid::parse_str(value).map_err(|_| invalid_uuid_error(field, value))
}
