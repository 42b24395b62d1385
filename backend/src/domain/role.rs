//! Roles and their precedence levels.
//!
//! Role names are plain identifiers referenced by server code. Precedence is
//! decided by the numeric [`RoleLevel`] loaded with the role, never by
//! comparing names.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Validation errors for role names.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoleValidationError {
    /// Name was blank.
    #[error("role name must not be empty")]
    EmptyName,
    /// Name contained characters outside `[a-z0-9_]`.
    #[error("role name may only contain lowercase letters, digits, or underscores")]
    InvalidName,
}

/// Unique role identifier such as `moderator`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, example = "moderator")]
pub struct RoleName(String);

impl RoleName {
    /// Role assigned to every newly registered user.
    pub const USER: &'static str = "user";
    /// Role allowed to edit posts owned by others.
    pub const MODERATOR: &'static str = "moderator";
    /// Role allowed to delete posts owned by others.
    pub const ADMIN: &'static str = "admin";

    /// Validate and construct a role name.
    pub fn new(name: impl Into<String>) -> Result<Self, RoleValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(RoleValidationError::EmptyName);
        }
        if !name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        {
            return Err(RoleValidationError::InvalidName);
        }
        Ok(Self(name))
    }

    /// The default `user` role.
    pub fn user() -> Self {
        Self(Self::USER.to_owned())
    }

    /// The `moderator` role.
    pub fn moderator() -> Self {
        Self(Self::MODERATOR.to_owned())
    }

    /// The `admin` role.
    pub fn admin() -> Self {
        Self(Self::ADMIN.to_owned())
    }

    /// Borrow the name.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for RoleName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for RoleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<RoleName> for String {
    fn from(value: RoleName) -> Self {
        value.0
    }
}

impl TryFrom<String> for RoleName {
    type Error = RoleValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Precedence of a role; higher is more privileged.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct RoleLevel(i32);

impl RoleLevel {
    /// Wrap a raw level.
    pub const fn new(level: i32) -> Self {
        Self(level)
    }

    /// Raw numeric level.
    pub const fn value(self) -> i32 {
        self.0
    }
}

/// A named role with its precedence level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    name: RoleName,
    description: String,
    level: RoleLevel,
}

impl Role {
    /// Build a role from its stored parts.
    pub fn new(name: RoleName, description: impl Into<String>, level: RoleLevel) -> Self {
        Self {
            name,
            description: description.into(),
            level,
        }
    }

    /// Unique role name.
    pub fn name(&self) -> &RoleName {
        &self.name
    }

    /// Human description.
    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    /// Precedence level.
    pub fn level(&self) -> RoleLevel {
        self.level
    }

    /// Whether this role is at least as privileged as `other`.
    pub fn is_at_least(&self, other: &Role) -> bool {
        self.level >= other.level
    }
}
