//! Post and comment domain service.
//!
//! Edits are guarded twice: the authorization gate decides who may touch a
//! post, and the stored version decides whether the edit is still based on
//! the latest state.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::info;

use crate::domain::authorization::AuthorizationGate;
use crate::domain::ports::{
    CommentRepository, CommentRepositoryError, CreatePostRequest, PostRepository,
    PostRepositoryError, PostsCommand, PostsQuery, RoleRepository, UpdatePostRequest,
};
use crate::domain::{
    Comment, CommentContent, CommentId, Error, NewComment, NewPost, Post, PostId, RoleName, User,
};

/// Implements [`PostsCommand`] and [`PostsQuery`].
pub struct PostService<P, C, R> {
    posts: Arc<P>,
    comments: Arc<C>,
    gate: AuthorizationGate<R>,
}

impl<P, C, R> PostService<P, C, R> {
    pub fn new(posts: Arc<P>, comments: Arc<C>, roles: Arc<R>) -> Self {
        Self {
            posts,
            comments,
            gate: AuthorizationGate::new(roles),
        }
    }
}

fn map_post_error(error: PostRepositoryError) -> Error {
    if let Some(mapped) = error.storage_error() {
        return mapped;
    }
    match error {
        PostRepositoryError::NotFound => Error::not_found("post not found"),
        PostRepositoryError::UnknownAuthor => Error::not_found("author not found"),
        other => Error::internal(other.to_string()),
    }
}

fn map_comment_error(error: CommentRepositoryError) -> Error {
    if let Some(mapped) = error.storage_error() {
        return mapped;
    }
    match error {
        CommentRepositoryError::PostNotFound => Error::not_found("post not found"),
        other => Error::internal(other.to_string()),
    }
}

#[async_trait]
impl<P, C, R> PostsCommand for PostService<P, C, R>
where
    P: PostRepository,
    C: CommentRepository,
    R: RoleRepository,
{
    async fn create_post(&self, actor: &User, request: CreatePostRequest) -> Result<Post, Error> {
        let CreatePostRequest {
            title,
            content,
            tags,
        } = request;
        let post = self
            .posts
            .create(&NewPost {
                id: PostId::random(),
                author_id: *actor.id(),
                title,
                content,
                tags,
            })
            .await
            .map_err(map_post_error)?;
        info!(post_id = %post.id(), user_id = %actor.id(), "post created");
        Ok(post)
    }

    async fn update_post(
        &self,
        actor: &User,
        id: &PostId,
        request: UpdatePostRequest,
    ) -> Result<Post, Error> {
        let current = self.posts.find_by_id(id).await.map_err(map_post_error)?;
        self.gate
            .require_mutation(actor, current.author_id(), &RoleName::moderator())
            .await?;

        let update = request
            .patch
            .apply_to(&current, request.expected_version)
            .map_err(|err| {
                Error::conflict(err.to_string())
                    .with_details(json!({ "field": "version", "code": "version_exhausted" }))
            })?;
        self.posts.update(&update).await.map_err(map_post_error)
    }

    async fn delete_post(&self, actor: &User, id: &PostId) -> Result<(), Error> {
        let current = self.posts.find_by_id(id).await.map_err(map_post_error)?;
        self.gate
            .require_mutation(actor, current.author_id(), &RoleName::admin())
            .await?;

        self.posts.delete(id).await.map_err(map_post_error)?;
        info!(post_id = %id, user_id = %actor.id(), "post deleted");
        Ok(())
    }

    async fn add_comment(
        &self,
        actor: &User,
        post_id: &PostId,
        content: CommentContent,
    ) -> Result<Comment, Error> {
        self.comments
            .create(&NewComment {
                id: CommentId::random(),
                post_id: *post_id,
                author_id: *actor.id(),
                content,
            })
            .await
            .map_err(map_comment_error)
    }
}

#[async_trait]
impl<P, C, R> PostsQuery for PostService<P, C, R>
where
    P: PostRepository,
    C: CommentRepository,
    R: RoleRepository,
{
    async fn get_post(&self, id: &PostId) -> Result<Post, Error> {
        let post = self.posts.find_by_id(id).await.map_err(map_post_error)?;
        let comments = self
            .comments
            .list_for_post(id)
            .await
            .map_err(map_comment_error)?;
        Ok(post.with_comments(comments))
    }
}

#[cfg(test)]
#[path = "post_service_tests.rs"]
mod tests;
