//! Posts API handlers.
//!
//! ```text
//! POST /api/v1/posts {"title":"Hello","content":"First post","tags":["intro"]}
//! PATCH /api/v1/posts/{post_id} {"title":"Hello again","version":0}
//! POST /api/v1/posts/{post_id}/comments {"content":"Nice"}
//! ```
//!
//! Edits carry the `version` the client last read. A stale version is
//! reported as `404 Not Found`; clients re-read the post and retry.

use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{CreatePostRequest, UpdatePostRequest};
use crate::domain::{
    Comment, CommentContent, Error, Post, PostContent, PostId, PostPatch, PostTitle, PostVersion,
    Tags,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, invalid_field, parse_uuid};

const POST_ID: FieldName = FieldName::new("postId");

/// Request body for `POST /api/v1/posts`.
#[derive(Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostBody {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl TryFrom<CreatePostBody> for CreatePostRequest {
    type Error = Error;

    fn try_from(body: CreatePostBody) -> Result<Self, Self::Error> {
        Ok(Self {
            title: PostTitle::new(&body.title).map_err(|err| invalid_field(&err))?,
            content: PostContent::new(&body.content).map_err(|err| invalid_field(&err))?,
            tags: Tags::new(&body.tags).map_err(|err| invalid_field(&err))?,
        })
    }
}

/// Request body for `PATCH /api/v1/posts/{post_id}`.
#[derive(Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostBody {
    pub title: Option<String>,
    pub content: Option<String>,
    /// Version returned by the last read of this post.
    pub version: i32,
}

impl TryFrom<UpdatePostBody> for UpdatePostRequest {
    type Error = Error;

    fn try_from(body: UpdatePostBody) -> Result<Self, Self::Error> {
        let patch = PostPatch::try_from_parts(body.title.as_deref(), body.content.as_deref())
            .map_err(|err| invalid_field(&err))?;
        Ok(Self {
            expected_version: PostVersion::new(body.version),
            patch,
        })
    }
}

/// Request body for `POST /api/v1/posts/{post_id}/comments`.
#[derive(Deserialize, Serialize, ToSchema)]
pub struct CreateCommentBody {
    pub content: String,
}

fn post_id(raw: &str) -> Result<PostId, Error> {
    parse_uuid(raw, POST_ID).map(PostId::from_uuid)
}

/// Publish a post as the caller.
#[utoipa::path(
    post,
    path = "/api/v1/posts",
    request_body = CreatePostBody,
    responses(
        (status = 201, description = "Post created", body = Post),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 503, description = "Storage unavailable", body = Error)
    ),
    tags = ["posts"],
    operation_id = "createPost"
)]
#[post("/posts")]
pub async fn create_post(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    payload: web::Json<CreatePostBody>,
) -> ApiResult<HttpResponse> {
    let request = CreatePostRequest::try_from(payload.into_inner())?;
    let post = state.posts.create_post(caller.user(), request).await?;
    Ok(HttpResponse::Created().json(post))
}

/// Fetch a post with its comments, newest comment first.
#[utoipa::path(
    get,
    path = "/api/v1/posts/{post_id}",
    params(("post_id" = String, Path, description = "Post identifier")),
    responses(
        (status = 200, description = "Post", body = Post),
        (status = 400, description = "Invalid post id", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["posts"],
    operation_id = "getPost"
)]
#[get("/posts/{post_id}")]
pub async fn get_post(
    state: web::Data<HttpState>,
    _caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<Post>> {
    let id = post_id(&path)?;
    let post = state.posts_query.get_post(&id).await?;
    Ok(web::Json(post))
}

/// Edit a post. Allowed for its author or a moderator and above.
#[utoipa::path(
    patch,
    path = "/api/v1/posts/{post_id}",
    params(("post_id" = String, Path, description = "Post identifier")),
    request_body = UpdatePostBody,
    responses(
        (status = 200, description = "Post updated", body = Post),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found or stale version", body = Error)
    ),
    tags = ["posts"],
    operation_id = "updatePost"
)]
#[patch("/posts/{post_id}")]
pub async fn update_post(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<UpdatePostBody>,
) -> ApiResult<web::Json<Post>> {
    let id = post_id(&path)?;
    let request = UpdatePostRequest::try_from(payload.into_inner())?;
    let post = state.posts.update_post(caller.user(), &id, request).await?;
    Ok(web::Json(post))
}

/// Delete a post. Allowed for its author or an admin.
#[utoipa::path(
    delete,
    path = "/api/v1/posts/{post_id}",
    params(("post_id" = String, Path, description = "Post identifier")),
    responses(
        (status = 204, description = "Post deleted"),
        (status = 400, description = "Invalid post id", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["posts"],
    operation_id = "deletePost"
)]
#[delete("/posts/{post_id}")]
pub async fn delete_post(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = post_id(&path)?;
    state.posts.delete_post(caller.user(), &id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Comment on a post as the caller.
#[utoipa::path(
    post,
    path = "/api/v1/posts/{post_id}/comments",
    params(("post_id" = String, Path, description = "Post identifier")),
    request_body = CreateCommentBody,
    responses(
        (status = 201, description = "Comment created", body = Comment),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Post not found", body = Error)
    ),
    tags = ["posts"],
    operation_id = "createComment"
)]
#[post("/posts/{post_id}/comments")]
pub async fn create_comment(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<CreateCommentBody>,
) -> ApiResult<HttpResponse> {
    let id = post_id(&path)?;
    let content = CommentContent::new(&payload.content).map_err(|err| invalid_field(&err))?;
    let comment = state.posts.add_comment(caller.user(), &id, content).await?;
    Ok(HttpResponse::Created().json(comment))
}

/// Register the posts routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(create_post)
        .service(get_post)
        .service(update_post)
        .service(delete_post)
        .service(create_comment);
}
