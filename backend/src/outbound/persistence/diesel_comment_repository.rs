//! PostgreSQL-backed `CommentRepository`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{CommentRepository, CommentRepositoryError};
use crate::domain::{Comment, NewComment, PostId};

use super::diesel_helpers::{DieselFailure, classify, collect_rows, map_pool_error_message};
use super::models::{CommentRow, NewCommentRow};
use super::pool::{DbPool, PoolError, with_timeout};
use super::schema::{comments, users};

#[derive(Clone)]
pub struct DieselCommentRepository {
    pool: DbPool,
}

impl DieselCommentRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> CommentRepositoryError {
    CommentRepositoryError::connection(map_pool_error_message(error))
}

fn map_diesel_error(error: diesel::result::Error, operation: &str) -> CommentRepositoryError {
    match classify(error, operation) {
        DieselFailure::ForeignKeyViolation { .. } => CommentRepositoryError::post_not_found(),
        DieselFailure::Connection => {
            CommentRepositoryError::connection("database connection error")
        }
        DieselFailure::Query(message) => CommentRepositoryError::query(message),
        _ => CommentRepositoryError::query("database error"),
    }
}

#[async_trait]
impl CommentRepository for DieselCommentRepository {
    async fn create(&self, comment: &NewComment) -> Result<Comment, CommentRepositoryError> {
        let row = NewCommentRow {
            id: *comment.id.as_uuid(),
            post_id: *comment.post_id.as_uuid(),
            user_id: *comment.author_id.as_uuid(),
            content: comment.content.as_str(),
        };
        let (stored, username) = with_timeout(
            self.pool.query_timeout(),
            async {
                let mut conn = self.pool.get().await.map_err(map_pool_error)?;
                let stored = diesel::insert_into(comments::table)
                    .values(&row)
                    .returning(CommentRow::as_returning())
                    .get_result(&mut conn)
                    .await
                    .map_err(|err| map_diesel_error(err, "create comment"))?;
                let username = users::table
                    .find(stored.user_id)
                    .select(users::username)
                    .first::<String>(&mut conn)
                    .await
                    .map_err(|err| map_diesel_error(err, "load comment author"))?;
                Ok((stored, username))
            },
            CommentRepositoryError::timeout,
        )
        .await?;

        stored
            .into_comment(&username)
            .map_err(CommentRepositoryError::query)
    }

    async fn list_for_post(
        &self,
        post_id: &PostId,
    ) -> Result<Vec<Comment>, CommentRepositoryError> {
        let post_id = *post_id.as_uuid();
        let rows = with_timeout(
            self.pool.query_timeout(),
            async {
                let mut conn = self.pool.get().await.map_err(map_pool_error)?;
                comments::table
                    .inner_join(users::table)
                    .filter(comments::post_id.eq(post_id))
                    .order_by(comments::created_at.desc())
                    .select((CommentRow::as_select(), users::username))
                    .load::<(CommentRow, String)>(&mut conn)
                    .await
                    .map_err(|err| map_diesel_error(err, "list comments"))
            },
            CommentRepositoryError::timeout,
        )
        .await?;

        collect_rows(
            rows.into_iter()
                .map(|(row, username)| row.into_comment(&username)),
            CommentRepositoryError::query,
        )
    }
}
