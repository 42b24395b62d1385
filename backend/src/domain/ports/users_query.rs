//! Driving port for user-facing queries.

use async_trait::async_trait;

use crate::domain::{Error, User, UserId};

/// Domain use-case port for reading users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersQuery: Send + Sync {
    /// Fetch an active user. Absent and pending users both yield
    /// `not_found`.
    async fn get_user(&self, id: &UserId) -> Result<User, Error>;
}
