//! Port for the aggregated feed read model.

use async_trait::async_trait;

use crate::domain::{FeedItem, FeedQuery, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by feed repository adapters.
    pub enum FeedRepositoryError storage = "feed repository" {
    }
}

/// Port for reading a user's feed.
///
/// Implementations must compute author usernames and comment counts in the
/// same pass as pagination so each page reflects one consistent snapshot.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FeedRepository: Send + Sync {
    /// Posts authored by users that `viewer` follows, filtered, sorted by
    /// creation time and paginated per `query`.
    async fn user_feed(
        &self,
        viewer: &UserId,
        query: &FeedQuery,
    ) -> Result<Vec<FeedItem>, FeedRepositoryError>;
}
