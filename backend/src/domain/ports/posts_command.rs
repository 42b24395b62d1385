//! Driving ports for post and comment use-cases.
//!
//! Every mutation carries the acting user so the domain can apply the
//! ownership-or-role authorization rule itself.

use async_trait::async_trait;

use crate::domain::{
    Comment, CommentContent, Error, Post, PostContent, PostId, PostPatch, PostTitle, PostVersion,
    Tags, User,
};

/// Validated input for a new post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePostRequest {
    pub title: PostTitle,
    pub content: PostContent,
    pub tags: Tags,
}

/// Validated input for an edit guarded by the version the client last saw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatePostRequest {
    pub expected_version: PostVersion,
    pub patch: PostPatch,
}

/// Domain use-case port for post mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostsCommand: Send + Sync {
    /// Publish a post authored by `actor`.
    async fn create_post(&self, actor: &User, request: CreatePostRequest) -> Result<Post, Error>;

    /// Edit a post. Allowed for the owner or a moderator and above.
    ///
    /// A stale `expected_version` yields `not_found`; clients should re-read
    /// the post and retry.
    async fn update_post(
        &self,
        actor: &User,
        id: &PostId,
        request: UpdatePostRequest,
    ) -> Result<Post, Error>;

    /// Remove a post. Allowed for the owner or an admin.
    async fn delete_post(&self, actor: &User, id: &PostId) -> Result<(), Error>;

    /// Comment on a post as `actor`.
    async fn add_comment(
        &self,
        actor: &User,
        post_id: &PostId,
        content: CommentContent,
    ) -> Result<Comment, Error>;
}

/// Domain use-case port for reading posts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostsQuery: Send + Sync {
    /// Fetch a post with its comments attached.
    async fn get_post(&self, id: &PostId) -> Result<Post, Error>;
}
