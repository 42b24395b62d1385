//! Driving port for follow relationships.

use async_trait::async_trait;

use crate::domain::{Error, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FollowCommand: Send + Sync {
    /// Make `follower` follow `followed`. Following twice is a `conflict`.
    async fn follow(&self, followed: &UserId, follower: &UserId) -> Result<(), Error>;

    /// Stop following. Removing a missing edge is `not_found`.
    async fn unfollow(&self, followed: &UserId, follower: &UserId) -> Result<(), Error>;
}
