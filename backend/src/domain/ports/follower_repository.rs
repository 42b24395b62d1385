//! Port for follower relationships.
//!
//! An edge `(followed, follower)` means *follower* sees *followed*'s posts
//! in their feed. Adapters store it as `user_id = followed`,
//! `follower_id = follower`.

use async_trait::async_trait;

use crate::domain::UserId;

use super::define_port_error;

define_port_error! {
    /// Errors raised by follower repository adapters.
    pub enum FollowerRepositoryError storage = "follower repository" {
        /// The edge already exists.
        AlreadyFollowing => "already following this user",
        /// One of the users does not exist.
        UserNotFound => "user to follow not found",
        /// No such edge to remove.
        NotFound => "follow relationship not found",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FollowerRepository: Send + Sync {
    /// Record that `follower` follows `followed`.
    async fn follow(
        &self,
        followed: &UserId,
        follower: &UserId,
    ) -> Result<(), FollowerRepositoryError>;

    /// Remove the edge recorded by [`follow`](Self::follow).
    async fn unfollow(
        &self,
        followed: &UserId,
        follower: &UserId,
    ) -> Result<(), FollowerRepositoryError>;
}
