//! Port for reading the role table.
//!
//! Roles are loaded at deployment time and rarely change, so adapters may
//! cache them. Precedence is the stored level; nothing is computed here.

use async_trait::async_trait;

use crate::domain::{Role, RoleName};

use super::define_port_error;

define_port_error! {
    /// Errors raised by role repository adapters.
    pub enum RoleRepositoryError storage = "role repository" {
    }
}

/// Port for role lookups.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// Fetch a role by its unique name. Returns `None` when no such role
    /// exists.
    async fn find_by_name(&self, name: &RoleName) -> Result<Option<Role>, RoleRepositoryError>;
}
