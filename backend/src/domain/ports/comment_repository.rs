//! Port for comment persistence.

use async_trait::async_trait;

use crate::domain::{Comment, NewComment, PostId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by comment repository adapters.
    pub enum CommentRepositoryError storage = "comment repository" {
        /// The referenced post does not exist.
        PostNotFound => "commented post not found",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Insert a comment and return it with its author's username.
    async fn create(&self, comment: &NewComment) -> Result<Comment, CommentRepositoryError>;

    /// Comments on a post, newest first.
    async fn list_for_post(&self, post_id: &PostId) -> Result<Vec<Comment>, CommentRepositoryError>;
}
