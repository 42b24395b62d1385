//! Port for post persistence with optimistic concurrency.

use async_trait::async_trait;

use crate::domain::{NewPost, Post, PostId, PostUpdate};

use super::define_port_error;

define_port_error! {
    /// Errors raised by post repository adapters.
    pub enum PostRepositoryError storage = "post repository" {
        /// No row matched: the post is absent or, for updates, the supplied
        /// version is stale.
        NotFound => "post not found",
        /// The author referenced by a new post does not exist.
        UnknownAuthor => "post author does not exist",
    }
}

/// Port for post storage.
///
/// # Version semantics
///
/// - New posts start at [`PostVersion::INITIAL`](crate::domain::PostVersion::INITIAL).
/// - [`update`](Self::update) writes only when both id and
///   `expected_version` match, incrementing the version by one. Zero
///   matched rows is reported as [`PostRepositoryError::NotFound`]; callers
///   cannot tell a missing post from a stale version and should re-read.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Insert a post and return it as stored.
    async fn create(&self, post: &NewPost) -> Result<Post, PostRepositoryError>;

    /// Fetch a post without comments. Absence is
    /// [`PostRepositoryError::NotFound`].
    async fn find_by_id(&self, id: &PostId) -> Result<Post, PostRepositoryError>;

    /// Apply a conditional update and return the post at its new version.
    async fn update(&self, update: &PostUpdate) -> Result<Post, PostRepositoryError>;

    /// Delete a post. Zero affected rows is [`PostRepositoryError::NotFound`].
    async fn delete(&self, id: &PostId) -> Result<(), PostRepositoryError>;
}
