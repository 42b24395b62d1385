//! Feed read service.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::ports::{FeedRepository, FeedRepositoryError, UserFeedQuery};
use crate::domain::{Error, FeedItem, FeedQuery, UserId};

/// Implements [`UserFeedQuery`] over a [`FeedRepository`].
pub struct FeedService<F> {
    feed: Arc<F>,
}

impl<F> FeedService<F> {
    pub fn new(feed: Arc<F>) -> Self {
        Self { feed }
    }
}

fn map_feed_error(error: &FeedRepositoryError) -> Error {
    error
        .storage_error()
        .unwrap_or_else(|| Error::internal(error.to_string()))
}

#[async_trait]
impl<F> UserFeedQuery for FeedService<F>
where
    F: FeedRepository,
{
    async fn user_feed(&self, viewer: &UserId, query: &FeedQuery) -> Result<Vec<FeedItem>, Error> {
        self.feed
            .user_feed(viewer, query)
            .await
            .map_err(|err| map_feed_error(&err))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ports::MockFeedRepository;
    use crate::domain::{ErrorCode, SortDirection};
    use mockall::predicate::eq;

    #[tokio::test]
    async fn forwards_viewer_and_query() {
        let viewer = UserId::random();
        let query = FeedQuery::default()
            .with_limit(5)
            .expect("limit")
            .with_sort(SortDirection::Asc);
        let mut repo = MockFeedRepository::new();
        repo.expect_user_feed()
            .with(eq(viewer), eq(query.clone()))
            .times(1)
            .returning(|_, _| Ok(Vec::new()));

        let items = FeedService::new(Arc::new(repo))
            .user_feed(&viewer, &query)
            .await
            .expect("feed");
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn timeout_is_service_unavailable() {
        let mut repo = MockFeedRepository::new();
        repo.expect_user_feed()
            .returning(|_, _| Err(FeedRepositoryError::timeout()));

        let err = FeedService::new(Arc::new(repo))
            .user_feed(&UserId::random(), &FeedQuery::default())
            .await
            .expect_err("timeout");
        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    }
}
