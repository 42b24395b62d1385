//! Role lookup service.
//!
//! Roles are referenced by name only from server code, never from request
//! payloads, so an unknown name is a deployment fault rather than a client
//! mistake and surfaces as an internal error.

use std::sync::Arc;

use tracing::error;

use crate::domain::ports::{RoleRepository, RoleRepositoryError};
use crate::domain::{Error, Role, RoleName};

/// Resolves role names to their stored definition and precedence level.
pub struct RoleHierarchy<R> {
    roles: Arc<R>,
}

impl<R> Clone for RoleHierarchy<R> {
    fn clone(&self) -> Self {
        Self {
            roles: Arc::clone(&self.roles),
        }
    }
}

impl<R> RoleHierarchy<R> {
    pub fn new(roles: Arc<R>) -> Self {
        Self { roles }
    }
}

impl<R> RoleHierarchy<R>
where
    R: RoleRepository,
{
    /// Fetch the role called `name`.
    pub async fn get_role_by_name(&self, name: &RoleName) -> Result<Role, Error> {
        match self.roles.find_by_name(name).await {
            Ok(Some(role)) => Ok(role),
            Ok(None) => {
                error!(role = %name, "role is not defined in the role table");
                Err(Error::internal(format!("role {name} is not configured")))
            }
            Err(err) => Err(map_role_error(&err)),
        }
    }
}

fn map_role_error(error: &RoleRepositoryError) -> Error {
    error
        .storage_error()
        .unwrap_or_else(|| Error::internal(error.to_string()))
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::MockRoleRepository;
    use crate::domain::RoleLevel;
    use rstest::rstest;

    fn hierarchy(repo: MockRoleRepository) -> RoleHierarchy<MockRoleRepository> {
        RoleHierarchy::new(Arc::new(repo))
    }

    #[tokio::test]
    async fn returns_stored_role() {
        let mut repo = MockRoleRepository::new();
        repo.expect_find_by_name()
            .withf(|name| name.as_str() == "moderator")
            .times(1)
            .return_once(|name| Ok(Some(Role::new(name.clone(), "mods", RoleLevel::new(2)))));

        let role = hierarchy(repo)
            .get_role_by_name(&RoleName::moderator())
            .await
            .expect("role resolves");
        assert_eq!(role.level(), RoleLevel::new(2));
    }

    #[tokio::test]
    async fn unknown_role_is_internal() {
        let mut repo = MockRoleRepository::new();
        repo.expect_find_by_name().return_once(|_| Ok(None));

        let err = hierarchy(repo)
            .get_role_by_name(&RoleName::admin())
            .await
            .expect_err("unknown role");
        assert_eq!(err.code(), ErrorCode::InternalError);
    }

    #[rstest]
    #[case(RoleRepositoryError::timeout(), ErrorCode::ServiceUnavailable)]
    #[case(RoleRepositoryError::connection("refused"), ErrorCode::ServiceUnavailable)]
    #[case(RoleRepositoryError::query("syntax"), ErrorCode::InternalError)]
    #[tokio::test]
    async fn repository_failures_are_classified(
        #[case] failure: RoleRepositoryError,
        #[case] expected: ErrorCode,
    ) {
        let mut repo = MockRoleRepository::new();
        repo.expect_find_by_name().return_once(move |_| Err(failure));

        let err = hierarchy(repo)
            .get_role_by_name(&RoleName::user())
            .await
            .expect_err("lookup fails");
        assert_eq!(err.code(), expected);
    }
}
