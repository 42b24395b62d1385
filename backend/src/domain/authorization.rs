//! Ownership-or-role authorization for mutations.
//!
//! A mutation is allowed when the acting user owns the resource, or when
//! their role level is at least that of the required role. The check is
//! deliberately two-tier; it is not a general ACL.

use std::sync::Arc;

use tracing::{debug, error};

use crate::domain::ports::RoleRepository;
use crate::domain::role_hierarchy::RoleHierarchy;
use crate::domain::{Error, RoleName, User, UserId};

/// Decides whether a user may mutate a resource owned by someone.
pub struct AuthorizationGate<R> {
    hierarchy: RoleHierarchy<R>,
}

impl<R> Clone for AuthorizationGate<R> {
    fn clone(&self) -> Self {
        Self {
            hierarchy: self.hierarchy.clone(),
        }
    }
}

impl<R> AuthorizationGate<R> {
    pub fn new(roles: Arc<R>) -> Self {
        Self {
            hierarchy: RoleHierarchy::new(roles),
        }
    }
}

impl<R> AuthorizationGate<R>
where
    R: RoleRepository,
{
    /// Return whether `acting` may mutate a resource owned by `owner`.
    ///
    /// Owners are allowed without consulting the role table. A failed role
    /// lookup is reported as an internal error, never as a denial, so
    /// callers can tell "denied" from "could not decide".
    pub async fn authorize_mutation(
        &self,
        acting: &User,
        owner: &UserId,
        required: &RoleName,
    ) -> Result<bool, Error> {
        if acting.id() == owner {
            return Ok(true);
        }

        let required_role = self
            .hierarchy
            .get_role_by_name(required)
            .await
            .map_err(|err| {
                error!(role = %required, error = %err, "role lookup failed during authorization");
                Error::internal(format!("role lookup failed: {}", err.message()))
            })?;
        Ok(acting.role().is_at_least(&required_role))
    }

    /// Like [`authorize_mutation`](Self::authorize_mutation) but turns a
    /// denial into a `forbidden` error.
    pub async fn require_mutation(
        &self,
        acting: &User,
        owner: &UserId,
        required: &RoleName,
    ) -> Result<(), Error> {
        if self.authorize_mutation(acting, owner, required).await? {
            Ok(())
        } else {
            debug!(user_id = %acting.id(), role = %required, "mutation denied");
            Err(Error::forbidden("insufficient privileges"))
        }
    }
}
