//! PostgreSQL-backed `FollowerRepository`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::UserId;
use crate::domain::ports::{FollowerRepository, FollowerRepositoryError};

use super::diesel_helpers::{DieselFailure, classify, map_pool_error_message};
use super::models::NewFollowerRow;
use super::pool::{DbPool, PoolError, with_timeout};
use super::schema::followers;

#[derive(Clone)]
pub struct DieselFollowerRepository {
    pool: DbPool,
}

impl DieselFollowerRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> FollowerRepositoryError {
    FollowerRepositoryError::connection(map_pool_error_message(error))
}

fn map_diesel_error(error: diesel::result::Error, operation: &str) -> FollowerRepositoryError {
    match classify(error, operation) {
        DieselFailure::UniqueViolation { .. } => FollowerRepositoryError::already_following(),
        DieselFailure::ForeignKeyViolation { .. } => FollowerRepositoryError::user_not_found(),
        DieselFailure::CheckViolation { .. } => {
            FollowerRepositoryError::query("users cannot follow themselves")
        }
        DieselFailure::NotFound => FollowerRepositoryError::not_found(),
        DieselFailure::Connection => {
            FollowerRepositoryError::connection("database connection error")
        }
        DieselFailure::Query(message) => FollowerRepositoryError::query(message),
    }
}

#[async_trait]
impl FollowerRepository for DieselFollowerRepository {
    async fn follow(
        &self,
        followed: &UserId,
        follower: &UserId,
    ) -> Result<(), FollowerRepositoryError> {
        let row = NewFollowerRow {
            user_id: *followed.as_uuid(),
            follower_id: *follower.as_uuid(),
        };
        with_timeout(
            self.pool.query_timeout(),
            async {
                let mut conn = self.pool.get().await.map_err(map_pool_error)?;
                diesel::insert_into(followers::table)
                    .values(&row)
                    .execute(&mut conn)
                    .await
                    .map_err(|err| map_diesel_error(err, "follow"))?;
                Ok(())
            },
            FollowerRepositoryError::timeout,
        )
        .await
    }

    async fn unfollow(
        &self,
        followed: &UserId,
        follower: &UserId,
    ) -> Result<(), FollowerRepositoryError> {
        let (user_id, follower_id) = (*followed.as_uuid(), *follower.as_uuid());
        let removed = with_timeout(
            self.pool.query_timeout(),
            async {
                let mut conn = self.pool.get().await.map_err(map_pool_error)?;
                diesel::delete(
                    followers::table
                        .filter(followers::user_id.eq(user_id))
                        .filter(followers::follower_id.eq(follower_id)),
                )
                .execute(&mut conn)
                .await
                .map_err(|err| map_diesel_error(err, "unfollow"))
            },
            FollowerRepositoryError::timeout,
        )
        .await?;

        if removed == 0 {
            return Err(FollowerRepositoryError::not_found());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for error classification.
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        assert!(matches!(
            map_pool_error(PoolError::checkout("refused")),
            FollowerRepositoryError::Connection { .. }
        ));
    }
}
