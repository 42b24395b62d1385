//! In-memory role cache.
//!
//! The role table is tiny and changes only with deployments, so
//! [`CachingRoleRepository`] memoises successful lookups in front of any
//! [`RoleRepository`]. Misses and failures are never cached: a role added
//! later becomes visible on the next lookup.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::ports::{RoleRepository, RoleRepositoryError};
use crate::domain::{Role, RoleName};

/// Read-through cache decorating another role repository.
pub struct CachingRoleRepository<R> {
    inner: R,
    roles: RwLock<HashMap<RoleName, Role>>,
}

impl<R> CachingRoleRepository<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            roles: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl<R> RoleRepository for CachingRoleRepository<R>
where
    R: RoleRepository,
{
    async fn find_by_name(&self, name: &RoleName) -> Result<Option<Role>, RoleRepositoryError> {
        if let Some(role) = self.roles.read().await.get(name) {
            return Ok(Some(role.clone()));
        }

        let found = self.inner.find_by_name(name).await?;
        if let Some(role) = &found {
            debug!(role = %name, "caching role");
            self.roles.write().await.insert(name.clone(), role.clone());
        }
        Ok(found)
    }
}
