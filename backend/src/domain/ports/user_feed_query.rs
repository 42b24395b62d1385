//! Driving port for the personalised feed.

use async_trait::async_trait;

use crate::domain::{Error, FeedItem, FeedQuery, UserId};

/// Domain use-case port for reading a viewer's feed.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserFeedQuery: Send + Sync {
    /// One page of posts by users `viewer` follows.
    async fn user_feed(&self, viewer: &UserId, query: &FeedQuery) -> Result<Vec<FeedItem>, Error>;
}
