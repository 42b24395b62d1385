//! Feed pagination parameters and result rows.
//!
//! The sort direction is a closed enum so adapters can interpolate its SQL
//! keyword into query text; free-form input never reaches that position.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::post::{PostContent, PostId, PostTitle, PostVersion, Tags};
use super::user::{UserId, Username};

/// Default and maximum page size.
pub const FEED_LIMIT_MAX: i64 = 20;
/// Maximum number of tag filters.
pub const FEED_TAGS_MAX: usize = 5;
/// Maximum search text length in characters.
pub const FEED_SEARCH_MAX: usize = 100;

/// Validation errors for feed query parameters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FeedQueryError {
    #[error("limit must be an integer between 1 and {max}")]
    InvalidLimit { max: i64 },
    #[error("offset must be a non-negative integer")]
    InvalidOffset,
    #[error("sort must be either asc or desc")]
    InvalidSort,
    #[error("at most {max} tags may be supplied")]
    TooManyTags { max: usize },
    #[error("search must be at most {max} characters")]
    SearchTooLong { max: usize },
}

impl FeedQueryError {
    /// Query parameter the failure refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::InvalidLimit { .. } => "limit",
            Self::InvalidOffset => "offset",
            Self::InvalidSort => "sort",
            Self::TooManyTags { .. } => "tags",
            Self::SearchTooLong { .. } => "search",
        }
    }

    /// Stable machine-readable failure code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidLimit { .. } => "invalid_limit",
            Self::InvalidOffset => "invalid_offset",
            Self::InvalidSort => "invalid_sort",
            Self::TooManyTags { .. } => "too_many_tags",
            Self::SearchTooLong { .. } => "search_too_long",
        }
    }
}

/// Ordering of feed rows by post creation time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Oldest first.
    Asc,
    /// Newest first.
    #[default]
    Desc,
}

impl SortDirection {
    /// SQL keyword for this direction.
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl FromStr for SortDirection {
    type Err = FeedQueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(FeedQueryError::InvalidSort),
        }
    }
}

/// Validated feed query.
///
/// # Examples
/// ```
/// use social::domain::{FeedQuery, SortDirection};
///
/// let query = FeedQuery::try_from_parts(Some("5"), None, Some("asc"), Some("rust,go"), None)
///     .expect("valid query");
/// assert_eq!(query.limit(), 5);
/// assert_eq!(query.offset(), 0);
/// assert_eq!(query.sort(), SortDirection::Asc);
/// assert_eq!(query.tags(), ["rust".to_owned(), "go".to_owned()]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedQuery {
    limit: i64,
    offset: i64,
    sort: SortDirection,
    tags: Vec<String>,
    search: Option<String>,
}

impl Default for FeedQuery {
    fn default() -> Self {
        Self {
            limit: FEED_LIMIT_MAX,
            offset: 0,
            sort: SortDirection::Desc,
            tags: Vec::new(),
            search: None,
        }
    }
}

impl FeedQuery {
    /// Parse raw query-string values; absent values take their defaults.
    ///
    /// `tags` is a comma-separated list. Blank `tags` or `search` values are
    /// treated as absent.
    pub fn try_from_parts(
        limit: Option<&str>,
        offset: Option<&str>,
        sort: Option<&str>,
        tags: Option<&str>,
        search: Option<&str>,
    ) -> Result<Self, FeedQueryError> {
        let mut query = Self::default();
        if let Some(raw) = limit {
            let parsed = raw
                .trim()
                .parse::<i64>()
                .map_err(|_| FeedQueryError::InvalidLimit { max: FEED_LIMIT_MAX })?;
            query = query.with_limit(parsed)?;
        }
        if let Some(raw) = offset {
            let parsed = raw
                .trim()
                .parse::<i64>()
                .map_err(|_| FeedQueryError::InvalidOffset)?;
            query = query.with_offset(parsed)?;
        }
        if let Some(raw) = sort {
            query.sort = raw.parse()?;
        }
        if let Some(raw) = tags {
            query = query.with_tags(raw.split(','))?;
        }
        if let Some(raw) = search {
            query = query.with_search(raw)?;
        }
        Ok(query)
    }

    /// Replace the page size.
    pub fn with_limit(mut self, limit: i64) -> Result<Self, FeedQueryError> {
        if !(1..=FEED_LIMIT_MAX).contains(&limit) {
            return Err(FeedQueryError::InvalidLimit { max: FEED_LIMIT_MAX });
        }
        self.limit = limit;
        Ok(self)
    }

    /// Replace the number of rows to skip.
    pub fn with_offset(mut self, offset: i64) -> Result<Self, FeedQueryError> {
        if offset < 0 {
            return Err(FeedQueryError::InvalidOffset);
        }
        self.offset = offset;
        Ok(self)
    }

    /// Replace the sort direction.
    #[must_use]
    pub fn with_sort(mut self, sort: SortDirection) -> Self {
        self.sort = sort;
        self
    }

    /// Restrict to posts carrying any of `tags`.
    pub fn with_tags<I, S>(mut self, tags: I) -> Result<Self, FeedQueryError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let collected: Vec<String> = tags
            .into_iter()
            .map(|tag| tag.as_ref().trim().to_owned())
            .filter(|tag| !tag.is_empty())
            .collect();
        if collected.len() > FEED_TAGS_MAX {
            return Err(FeedQueryError::TooManyTags { max: FEED_TAGS_MAX });
        }
        self.tags = collected;
        Ok(self)
    }

    /// Restrict to posts whose title or content contains `search`.
    pub fn with_search(mut self, search: &str) -> Result<Self, FeedQueryError> {
        let trimmed = search.trim();
        if trimmed.chars().count() > FEED_SEARCH_MAX {
            return Err(FeedQueryError::SearchTooLong { max: FEED_SEARCH_MAX });
        }
        self.search = (!trimmed.is_empty()).then(|| trimmed.to_owned());
        Ok(self)
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }

    pub fn offset(&self) -> i64 {
        self.offset
    }

    pub fn sort(&self) -> SortDirection {
        self.sort
    }

    pub fn tags(&self) -> &[String] {
        self.tags.as_slice()
    }

    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }
}

/// One feed row: a post annotated with its author and comment count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FeedItem {
    pub id: PostId,
    pub author_id: UserId,
    pub author_username: Username,
    pub title: PostTitle,
    pub content: PostContent,
    pub tags: Tags,
    pub version: PostVersion,
    pub created_at: DateTime<Utc>,
    /// Number of comments attached when the page was read.
    pub comment_count: i64,
}
