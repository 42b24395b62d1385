//! PostgreSQL-backed `PostRepository` with optimistic concurrency.
//!
//! Updates are a single conditional `UPDATE ... WHERE id = $1 AND version =
//! $2 RETURNING *`; an empty result means the post is gone or the caller's
//! version is stale, and both surface as `NotFound`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{PostRepository, PostRepositoryError};
use crate::domain::{NewPost, Post, PostId, PostUpdate};

use super::diesel_helpers::{DieselFailure, classify, map_pool_error_message};
use super::models::{NewPostRow, PostChangeset, PostRow};
use super::pool::{DbPool, PoolError, with_timeout};
use super::schema::posts;

#[derive(Clone)]
pub struct DieselPostRepository {
    pool: DbPool,
}

impl DieselPostRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> PostRepositoryError {
    PostRepositoryError::connection(map_pool_error_message(error))
}

fn map_diesel_error(error: diesel::result::Error, operation: &str) -> PostRepositoryError {
    match classify(error, operation) {
        DieselFailure::NotFound => PostRepositoryError::not_found(),
        DieselFailure::ForeignKeyViolation { .. } => PostRepositoryError::unknown_author(),
        DieselFailure::Connection => PostRepositoryError::connection("database connection error"),
        DieselFailure::Query(message) => PostRepositoryError::query(message),
        DieselFailure::UniqueViolation { .. } | DieselFailure::CheckViolation { .. } => {
            PostRepositoryError::query("constraint violation")
        }
    }
}

fn into_post(row: PostRow) -> Result<Post, PostRepositoryError> {
    Post::try_from(row).map_err(PostRepositoryError::query)
}

#[async_trait]
impl PostRepository for DieselPostRepository {
    async fn create(&self, post: &NewPost) -> Result<Post, PostRepositoryError> {
        let row = NewPostRow {
            id: *post.id.as_uuid(),
            user_id: *post.author_id.as_uuid(),
            title: post.title.as_str(),
            content: post.content.as_str(),
            tags: post.tags.as_slice(),
        };
        let stored = with_timeout(
            self.pool.query_timeout(),
            async {
                let mut conn = self.pool.get().await.map_err(map_pool_error)?;
                diesel::insert_into(posts::table)
                    .values(&row)
                    .returning(PostRow::as_returning())
                    .get_result(&mut conn)
                    .await
                    .map_err(|err| map_diesel_error(err, "create post"))
            },
            PostRepositoryError::timeout,
        )
        .await?;
        into_post(stored)
    }

    async fn find_by_id(&self, id: &PostId) -> Result<Post, PostRepositoryError> {
        let post_id = *id.as_uuid();
        let stored = with_timeout(
            self.pool.query_timeout(),
            async {
                let mut conn = self.pool.get().await.map_err(map_pool_error)?;
                posts::table
                    .find(post_id)
                    .select(PostRow::as_select())
                    .first(&mut conn)
                    .await
                    .map_err(|err| map_diesel_error(err, "find post"))
            },
            PostRepositoryError::timeout,
        )
        .await?;
        into_post(stored)
    }

    async fn update(&self, update: &PostUpdate) -> Result<Post, PostRepositoryError> {
        let post_id = *update.id.as_uuid();
        let expected = update.expected_version.value();
        let changes = PostChangeset {
            title: update.title.as_str(),
            content: update.content.as_str(),
            version: update.next_version.value(),
        };
        let stored = with_timeout(
            self.pool.query_timeout(),
            async {
                let mut conn = self.pool.get().await.map_err(map_pool_error)?;
                diesel::update(
                    posts::table
                        .filter(posts::id.eq(post_id))
                        .filter(posts::version.eq(expected)),
                )
                .set((&changes, posts::updated_at.eq(diesel::dsl::now)))
                .returning(PostRow::as_returning())
                .get_result(&mut conn)
                .await
                .optional()
                .map_err(|err| map_diesel_error(err, "update post"))
            },
            PostRepositoryError::timeout,
        )
        .await?;

        stored
            .ok_or_else(PostRepositoryError::not_found)
            .and_then(into_post)
    }

    async fn delete(&self, id: &PostId) -> Result<(), PostRepositoryError> {
        let post_id = *id.as_uuid();
        let deleted = with_timeout(
            self.pool.query_timeout(),
            async {
                let mut conn = self.pool.get().await.map_err(map_pool_error)?;
                diesel::delete(posts::table.filter(posts::id.eq(post_id)))
                    .execute(&mut conn)
                    .await
                    .map_err(|err| map_diesel_error(err, "delete post"))
            },
            PostRepositoryError::timeout,
        )
        .await?;

        if deleted == 0 {
            return Err(PostRepositoryError::not_found());
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
    fn missing_row_maps_to_not_found() {
        assert_eq!(
            map_diesel_error(diesel::result::Error::NotFound, "test"),
            PostRepositoryError::NotFound
        );
    }

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        assert!(matches!(
            map_pool_error(PoolError::checkout("refused")),
            PostRepositoryError::Connection { .. }
        ));
    }
}
