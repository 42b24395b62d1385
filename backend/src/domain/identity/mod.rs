//! Identity use-cases: registration, activation, login and user lookup.
//!
//! The services here implement the identity driving ports over the
//! [`UserRepository`](crate::domain::ports::UserRepository) and the
//! hashing, signing and notification capabilities.

mod login;
mod registration;
mod users;

pub use login::{AuthService, TokenPolicy};
pub use registration::{RegistrationPolicy, RegistrationService};
pub use users::UsersService;

use serde_json::json;

use crate::domain::Error;
use crate::domain::ports::{PasswordHasherError, UserRepositoryError};

pub(crate) fn map_user_error(error: UserRepositoryError) -> Error {
    if let Some(mapped) = error.storage_error() {
        return mapped;
    }
    match error {
        UserRepositoryError::DuplicateEmail => duplicate("email"),
        UserRepositoryError::DuplicateUsername => duplicate("username"),
        UserRepositoryError::NotFound => Error::not_found("user not found"),
        UserRepositoryError::UnknownRole { role } => {
            Error::internal(format!("role {role} is not configured"))
        }
        other => Error::internal(other.to_string()),
    }
}

fn duplicate(field: &str) -> Error {
    Error::conflict(format!("a user with that {field} already exists")).with_details(json!({
        "field": field,
        "code": format!("duplicate_{field}"),
    }))
}

pub(crate) fn map_hasher_error(error: PasswordHasherError) -> Error {
    match error {
        PasswordHasherError::Hash { message } => {
            Error::internal(format!("password hashing failed: {message}"))
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case(UserRepositoryError::duplicate_email(), "email")]
    #[case(UserRepositoryError::duplicate_username(), "username")]
    fn duplicates_are_conflicts_naming_the_field(
        #[case] error: UserRepositoryError,
        #[case] field: &str,
    ) {
        let mapped = map_user_error(error);
        assert_eq!(mapped.code(), ErrorCode::Conflict);
        let details = mapped.details().expect("details");
        assert_eq!(details["field"], field);
        assert_eq!(details["code"], format!("duplicate_{field}"));
    }

    #[rstest]
    #[case(UserRepositoryError::not_found(), ErrorCode::NotFound)]
    #[case(UserRepositoryError::timeout(), ErrorCode::ServiceUnavailable)]
    #[case(UserRepositoryError::connection("down"), ErrorCode::ServiceUnavailable)]
    #[case(UserRepositoryError::query("boom"), ErrorCode::InternalError)]
    #[case(UserRepositoryError::unknown_role("user"), ErrorCode::InternalError)]
    fn infrastructure_failures_are_classified(
        #[case] error: UserRepositoryError,
        #[case] expected: ErrorCode,
    ) {
        assert_eq!(map_user_error(error).code(), expected);
    }
}
