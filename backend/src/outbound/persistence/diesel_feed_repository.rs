//! PostgreSQL-backed `FeedRepository`.
//!
//! The feed is one hand-written statement: author lookup, follower filter
//! and comment counting happen in the same pass as pagination. Only the sort
//! keyword is interpolated, and only from [`SortDirection::as_sql`]; every
//! other value is a bound parameter.

use async_trait::async_trait;
use diesel::sql_types::{Array, BigInt, Nullable, Text, Uuid as SqlUuid};
use diesel_async::RunQueryDsl;

use crate::domain::ports::{FeedRepository, FeedRepositoryError};
use crate::domain::{FeedItem, FeedQuery, SortDirection, UserId};

use super::diesel_helpers::{DieselFailure, classify, collect_rows, map_pool_error_message};
use super::models::FeedRow;
use super::pool::{DbPool, PoolError, with_timeout};

#[derive(Clone)]
pub struct DieselFeedRepository {
    pool: DbPool,
}

impl DieselFeedRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> FeedRepositoryError {
    FeedRepositoryError::connection(map_pool_error_message(error))
}

fn map_diesel_error(error: diesel::result::Error) -> FeedRepositoryError {
    match classify(error, "user feed") {
        DieselFailure::Connection => FeedRepositoryError::connection("database connection error"),
        DieselFailure::Query(message) => FeedRepositoryError::query(message),
        _ => FeedRepositoryError::query("database error"),
    }
}

/// Build the feed statement for `sort`.
///
/// Parameters: `$1` viewer, `$2` tags (nullable array), `$3` search pattern
/// (nullable), `$4` limit, `$5` offset.
pub(crate) fn feed_sql(sort: SortDirection) -> String {
    format!(
        "SELECT p.id, p.user_id, u.username, p.title, p.content, p.tags, p.version, \
                p.created_at, COUNT(c.id) AS comment_count \
         FROM posts p \
         JOIN users u ON u.id = p.user_id \
         JOIN followers f ON f.user_id = p.user_id AND f.follower_id = $1 \
         LEFT JOIN comments c ON c.post_id = p.id \
         WHERE ($2::text[] IS NULL OR p.tags && $2) \
           AND ($3::text IS NULL OR p.title ILIKE $3 OR p.content ILIKE $3) \
         GROUP BY p.id, u.username \
         ORDER BY p.created_at {direction}, p.id {direction} \
         LIMIT $4 OFFSET $5",
        direction = sort.as_sql()
    )
}

/// Wrap `search` for a substring `ILIKE`, escaping pattern metacharacters.
pub(crate) fn search_pattern(search: &str) -> String {
    let mut pattern = String::with_capacity(search.len() + 2);
    pattern.push('%');
    for ch in search.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

#[async_trait]
impl FeedRepository for DieselFeedRepository {
    async fn user_feed(
        &self,
        viewer: &UserId,
        query: &FeedQuery,
    ) -> Result<Vec<FeedItem>, FeedRepositoryError> {
        let sql = feed_sql(query.sort());
        let tags = (!query.tags().is_empty()).then(|| query.tags().to_vec());
        let search = query.search().map(search_pattern);
        let viewer = *viewer.as_uuid();

        let rows = with_timeout(
            self.pool.query_timeout(),
            async {
                let mut conn = self.pool.get().await.map_err(map_pool_error)?;
                diesel::sql_query(sql)
                    .bind::<SqlUuid, _>(viewer)
                    .bind::<Nullable<Array<Text>>, _>(tags)
                    .bind::<Nullable<Text>, _>(search)
                    .bind::<BigInt, _>(query.limit())
                    .bind::<BigInt, _>(query.offset())
                    .load::<FeedRow>(&mut conn)
                    .await
                    .map_err(map_diesel_error)
            },
            FeedRepositoryError::timeout,
        )
        .await?;

        collect_rows(
            rows.into_iter().map(FeedItem::try_from),
            FeedRepositoryError::query,
        )
    }
}
