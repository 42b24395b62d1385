//! Comments attached to posts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::identifier::uuid_identifier;
use super::post::{PostId, PostValidationError, CONTENT_MAX};
use super::user::{UserId, Username};

uuid_identifier! {
    /// Stable comment identifier.
    CommentId
}

/// Comment body, bounded like a post body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = String, example = "Nice post!")]
pub struct CommentContent(String);

impl CommentContent {
    /// Validate a comment body.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, PostValidationError> {
        let raw = raw.as_ref();
        if raw.trim().is_empty() {
            return Err(PostValidationError::EmptyContent);
        }
        if raw.chars().count() > CONTENT_MAX {
            return Err(PostValidationError::ContentTooLong { max: CONTENT_MAX });
        }
        Ok(Self(raw.to_owned()))
    }

    /// Borrow the body.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// A stored comment together with its author's username.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: CommentId,
    pub post_id: PostId,
    pub author_id: UserId,
    pub author_username: Username,
    pub content: CommentContent,
    pub created_at: DateTime<Utc>,
}

/// A comment about to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    pub id: CommentId,
    pub post_id: PostId,
    pub author_id: UserId,
    pub content: CommentContent,
}
