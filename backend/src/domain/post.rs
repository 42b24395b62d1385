//! Posts and their optimistic-concurrency version counter.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::comment::Comment;
use super::identifier::uuid_identifier;
use super::user::UserId;

uuid_identifier! {
    /// Stable post identifier.
    PostId
}

/// Maximum title length in characters.
pub const TITLE_MAX: usize = 100;
/// Maximum body length in characters.
pub const CONTENT_MAX: usize = 1000;
/// Maximum number of tags on a post.
pub const TAGS_MAX: usize = 16;
/// Maximum characters in a single tag.
pub const TAG_MAX: usize = 50;

/// Validation errors for post payloads.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PostValidationError {
    #[error("title must not be empty")]
    EmptyTitle,
    #[error("title must be at most {max} characters")]
    TitleTooLong { max: usize },
    #[error("content must not be empty")]
    EmptyContent,
    #[error("content must be at most {max} characters")]
    ContentTooLong { max: usize },
    #[error("a post may carry at most {max} tags")]
    TooManyTags { max: usize },
    #[error("tags must not be empty")]
    EmptyTag,
    #[error("tags must be at most {max} characters")]
    TagTooLong { max: usize },
    #[error("an update must change the title or the content")]
    EmptyPatch,
}

impl PostValidationError {
    /// Request field the failure refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyTitle | Self::TitleTooLong { .. } => "title",
            Self::EmptyContent | Self::ContentTooLong { .. } => "content",
            Self::TooManyTags { .. } | Self::EmptyTag | Self::TagTooLong { .. } => "tags",
            Self::EmptyPatch => "body",
        }
    }

    /// Stable machine-readable failure code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyTitle => "empty_title",
            Self::TitleTooLong { .. } => "title_too_long",
            Self::EmptyContent => "empty_content",
            Self::ContentTooLong { .. } => "content_too_long",
            Self::TooManyTags { .. } => "too_many_tags",
            Self::EmptyTag => "empty_tag",
            Self::TagTooLong { .. } => "tag_too_long",
            Self::EmptyPatch => "empty_patch",
        }
    }
}

fn bounded_text(
    raw: &str,
    max: usize,
    empty: PostValidationError,
    too_long: PostValidationError,
) -> Result<String, PostValidationError> {
    if raw.trim().is_empty() {
        return Err(empty);
    }
    if raw.chars().count() > max {
        return Err(too_long);
    }
    Ok(raw.to_owned())
}

/// Post headline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = String, example = "Hello")]
pub struct PostTitle(String);

impl PostTitle {
    /// Validate a title.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, PostValidationError> {
        bounded_text(
            raw.as_ref(),
            TITLE_MAX,
            PostValidationError::EmptyTitle,
            PostValidationError::TitleTooLong { max: TITLE_MAX },
        )
        .map(Self)
    }

    /// Borrow the title.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Post body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = String)]
pub struct PostContent(String);

impl PostContent {
    /// Validate a body.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, PostValidationError> {
        bounded_text(
            raw.as_ref(),
            CONTENT_MAX,
            PostValidationError::EmptyContent,
            PostValidationError::ContentTooLong { max: CONTENT_MAX },
        )
        .map(Self)
    }

    /// Borrow the body.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Unordered, de-duplicated tag set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = Vec<String>)]
pub struct Tags(Vec<String>);

impl Tags {
    /// Validate tags, trimming each and dropping repeats while keeping
    /// first-seen order.
    pub fn new<I, S>(raw: I) -> Result<Self, PostValidationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tags: Vec<String> = Vec::new();
        for tag in raw {
            let trimmed = tag.as_ref().trim();
            if trimmed.is_empty() {
                return Err(PostValidationError::EmptyTag);
            }
            if trimmed.chars().count() > TAG_MAX {
                return Err(PostValidationError::TagTooLong { max: TAG_MAX });
            }
            if !tags.iter().any(|existing| existing == trimmed) {
                tags.push(trimmed.to_owned());
            }
        }
        if tags.len() > TAGS_MAX {
            return Err(PostValidationError::TooManyTags { max: TAGS_MAX });
        }
        Ok(Self(tags))
    }

    /// Borrow the tags.
    pub fn as_slice(&self) -> &[String] {
        self.0.as_slice()
    }

    /// Consume into the raw list.
    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}

/// Optimistic-concurrency counter. Starts at zero and increments by exactly
/// one on every successful update.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct PostVersion(i32);

impl PostVersion {
    /// Version of a freshly created post.
    pub const INITIAL: Self = Self(0);

    /// Wrap a raw version.
    pub const fn new(version: i32) -> Self {
        Self(version)
    }

    /// Raw numeric version.
    pub const fn value(self) -> i32 {
        self.0
    }

    /// The version a successful update produces.
    ///
    /// # Errors
    /// [`VersionExhausted`] once the counter cannot grow any further.
    pub const fn next(self) -> Result<Self, VersionExhausted> {
        match self.0.checked_add(1) {
            Some(next) => Ok(Self(next)),
            None => Err(VersionExhausted(self.0)),
        }
    }
}

/// A post at the largest representable version cannot be edited again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("post version {0} cannot be incremented")]
pub struct VersionExhausted(pub i32);

/// A published post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    id: PostId,
    author_id: UserId,
    title: PostTitle,
    content: PostContent,
    tags: Tags,
    version: PostVersion,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    comments: Vec<Comment>,
}

/// Stored post fields, used to assemble a [`Post`].
#[derive(Debug, Clone)]
pub struct PostParts {
    pub id: PostId,
    pub author_id: UserId,
    pub title: PostTitle,
    pub content: PostContent,
    pub tags: Tags,
    pub version: PostVersion,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PostParts> for Post {
    fn from(parts: PostParts) -> Self {
        let PostParts {
            id,
            author_id,
            title,
            content,
            tags,
            version,
            created_at,
            updated_at,
        } = parts;
        Self {
            id,
            author_id,
            title,
            content,
            tags,
            version,
            created_at,
            updated_at,
            comments: Vec::new(),
        }
    }
}

impl Post {
    pub fn id(&self) -> &PostId {
        &self.id
    }

    /// Owner of the post.
    pub fn author_id(&self) -> &UserId {
        &self.author_id
    }

    pub fn title(&self) -> &PostTitle {
        &self.title
    }

    pub fn content(&self) -> &PostContent {
        &self.content
    }

    pub fn tags(&self) -> &Tags {
        &self.tags
    }

    pub fn version(&self) -> PostVersion {
        self.version
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Comments loaded on demand; empty unless attached.
    pub fn comments(&self) -> &[Comment] {
        self.comments.as_slice()
    }

    /// Attach comments loaded separately.
    #[must_use]
    pub fn with_comments(mut self, comments: Vec<Comment>) -> Self {
        self.comments = comments;
        self
    }

    /// Reflect a successful update performed by the store.
    #[must_use]
    pub fn updated(
        mut self,
        update: &PostUpdate,
        version: PostVersion,
        at: DateTime<Utc>,
    ) -> Self {
        self.title = update.title.clone();
        self.content = update.content.clone();
        self.version = version;
        self.updated_at = at;
        self
    }
}

/// A post about to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub id: PostId,
    pub author_id: UserId,
    pub title: PostTitle,
    pub content: PostContent,
    pub tags: Tags,
}

/// Partial edit supplied by a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostPatch {
    title: Option<PostTitle>,
    content: Option<PostContent>,
}

impl PostPatch {
    /// Validate raw optional fields; at least one must be present.
    pub fn try_from_parts(
        title: Option<&str>,
        content: Option<&str>,
    ) -> Result<Self, PostValidationError> {
        let title = title.map(PostTitle::new).transpose()?;
        let content = content.map(PostContent::new).transpose()?;
        if title.is_none() && content.is_none() {
            return Err(PostValidationError::EmptyPatch);
        }
        Ok(Self { title, content })
    }

    /// Combine with the current post into a conditional update.
    ///
    /// # Errors
    /// [`VersionExhausted`] when `expected_version` has no successor.
    pub fn apply_to(
        self,
        post: &Post,
        expected_version: PostVersion,
    ) -> Result<PostUpdate, VersionExhausted> {
        Ok(PostUpdate {
            id: post.id,
            expected_version,
            next_version: expected_version.next()?,
            title: self.title.unwrap_or_else(|| post.title.clone()),
            content: self.content.unwrap_or_else(|| post.content.clone()),
        })
    }
}

/// Conditional write: applies only when the stored version equals
/// `expected_version`, and stores `next_version` in its place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostUpdate {
    pub id: PostId,
    pub expected_version: PostVersion,
    pub next_version: PostVersion,
    pub title: PostTitle,
    pub content: PostContent,
}
