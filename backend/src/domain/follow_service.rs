//! Follow relationship service.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::info;

use crate::domain::ports::{FollowCommand, FollowerRepository, FollowerRepositoryError};
use crate::domain::{Error, UserId};

/// Implements [`FollowCommand`].
pub struct FollowService<F> {
    followers: Arc<F>,
}

impl<F> FollowService<F> {
    pub fn new(followers: Arc<F>) -> Self {
        Self { followers }
    }
}

fn map_follower_error(error: FollowerRepositoryError) -> Error {
    if let Some(mapped) = error.storage_error() {
        return mapped;
    }
    match error {
        FollowerRepositoryError::AlreadyFollowing => {
            Error::conflict("already following this user")
        }
        FollowerRepositoryError::UserNotFound => Error::not_found("user not found"),
        FollowerRepositoryError::NotFound => Error::not_found("not following this user"),
        other => Error::internal(other.to_string()),
    }
}

fn reject_self(followed: &UserId, follower: &UserId) -> Result<(), Error> {
    if followed == follower {
        return Err(Error::invalid_request("users cannot follow themselves")
            .with_details(json!({ "field": "userId", "code": "self_follow" })));
    }
    Ok(())
}

#[async_trait]
impl<F> FollowCommand for FollowService<F>
where
    F: FollowerRepository,
{
    async fn follow(&self, followed: &UserId, follower: &UserId) -> Result<(), Error> {
        reject_self(followed, follower)?;
        self.followers
            .follow(followed, follower)
            .await
            .map_err(map_follower_error)?;
        info!(%followed, %follower, "follow recorded");
        Ok(())
    }

    async fn unfollow(&self, followed: &UserId, follower: &UserId) -> Result<(), Error> {
        reject_self(followed, follower)?;
        self.followers
            .unfollow(followed, follower)
            .await
            .map_err(map_follower_error)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::MockFollowerRepository;
    use mockall::predicate::eq;
    use rstest::rstest;

    #[tokio::test]
    async fn follow_passes_edge_in_stored_order() {
        let followed = UserId::random();
        let follower = UserId::random();
        let mut repo = MockFollowerRepository::new();
        repo.expect_follow()
            .with(eq(followed), eq(follower))
            .times(1)
            .returning(|_, _| Ok(()));

        FollowService::new(Arc::new(repo))
            .follow(&followed, &follower)
            .await
            .expect("followed");
    }

    #[tokio::test]
    async fn self_follow_is_rejected_before_storage() {
        let mut repo = MockFollowerRepository::new();
        repo.expect_follow().never();
        let me = UserId::random();

        let err = FollowService::new(Arc::new(repo))
            .follow(&me, &me)
            .await
            .expect_err("self follow");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    #[case(FollowerRepositoryError::already_following(), ErrorCode::Conflict)]
    #[case(FollowerRepositoryError::user_not_found(), ErrorCode::NotFound)]
    #[case(FollowerRepositoryError::timeout(), ErrorCode::ServiceUnavailable)]
    #[tokio::test]
    async fn follow_failures_are_classified(
        #[case] failure: FollowerRepositoryError,
        #[case] expected: ErrorCode,
    ) {
        let mut repo = MockFollowerRepository::new();
        repo.expect_follow().return_once(move |_, _| Err(failure));

        let err = FollowService::new(Arc::new(repo))
            .follow(&UserId::random(), &UserId::random())
            .await
            .expect_err("failure");
        assert_eq!(err.code(), expected);
    }

    #[tokio::test]
    async fn unfollow_without_edge_is_not_found() {
        let mut repo = MockFollowerRepository::new();
        repo.expect_unfollow()
            .returning(|_, _| Err(FollowerRepositoryError::not_found()));

        let err = FollowService::new(Arc::new(repo))
            .unfollow(&UserId::random(), &UserId::random())
            .await
            .expect_err("missing edge");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }
}
