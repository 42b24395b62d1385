//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Conversions into domain types re-run
//! domain validation and report failures as plain messages so each
//! repository can wrap them in its own query error.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_types::{Array, BigInt, Int4, Text, Timestamptz, Uuid as SqlUuid, Varchar};
use uuid::Uuid;

use super::schema::{comments, followers, posts, roles, user_invitations, users};
use crate::domain::{
    Comment, CommentContent, CommentId, EmailAddress, FeedItem, Post, PostContent, PostId,
    PostParts, PostTitle, PostVersion, Role, RoleLevel, RoleName, Tags, User, UserId, Username,
};

// ---------------------------------------------------------------------------
// Roles and users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = roles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RoleRow {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub level: i32,
}

impl TryFrom<RoleRow> for Role {
    type Error = String;

    fn try_from(row: RoleRow) -> Result<Self, Self::Error> {
        let name = RoleName::new(row.name).map_err(|err| format!("stored role name: {err}"))?;
        Ok(Role::new(name, row.description, RoleLevel::new(row.level)))
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl UserRow {
    /// Assemble the domain user from this row and its joined role.
    pub fn into_user(self, role: RoleRow) -> Result<User, String> {
        let username =
            Username::new(&self.username).map_err(|err| format!("stored username: {err}"))?;
        let email = EmailAddress::new(&self.email).map_err(|err| format!("stored email: {err}"))?;
        let user = User::new(
            UserId::from_uuid(self.id),
            username,
            email,
            Role::try_from(role)?,
            self.created_at,
        );
        Ok(if self.is_active { user.activated() } else { user })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub role_id: i32,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = user_invitations)]
pub(crate) struct NewInvitationRow<'a> {
    pub token_hash: &'a str,
    pub user_id: Uuid,
    pub expiry: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Posts and comments
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = posts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PostRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<PostRow> for Post {
    type Error = String;

    fn try_from(row: PostRow) -> Result<Self, Self::Error> {
        Ok(Post::from(PostParts {
            id: PostId::from_uuid(row.id),
            author_id: UserId::from_uuid(row.user_id),
            title: PostTitle::new(&row.title).map_err(|err| format!("stored title: {err}"))?,
            content: PostContent::new(&row.content)
                .map_err(|err| format!("stored content: {err}"))?,
            tags: Tags::new(&row.tags).map_err(|err| format!("stored tags: {err}"))?,
            version: PostVersion::new(row.version),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }))
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = posts)]
pub(crate) struct NewPostRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: &'a str,
    pub content: &'a str,
    pub tags: &'a [String],
}

/// Conditional edit; `version` carries the incremented value and
/// `updated_at` is set to the database clock alongside it.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = posts)]
pub(crate) struct PostChangeset<'a> {
    pub title: &'a str,
    pub content: &'a str,
    pub version: i32,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = comments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CommentRow {
    pub id: Uuid,
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl CommentRow {
    pub fn into_comment(self, author_username: &str) -> Result<Comment, String> {
        Ok(Comment {
            id: CommentId::from_uuid(self.id),
            post_id: PostId::from_uuid(self.post_id),
            author_id: UserId::from_uuid(self.user_id),
            author_username: Username::new(author_username)
                .map_err(|err| format!("stored username: {err}"))?,
            content: CommentContent::new(&self.content)
                .map_err(|err| format!("stored comment: {err}"))?,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = comments)]
pub(crate) struct NewCommentRow<'a> {
    pub id: Uuid,
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub content: &'a str,
}

// ---------------------------------------------------------------------------
// Followers and feed
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = followers)]
pub(crate) struct NewFollowerRow {
    pub user_id: Uuid,
    pub follower_id: Uuid,
}

/// Row produced by the hand-written feed statement.
#[derive(Debug, Clone, QueryableByName)]
pub(crate) struct FeedRow {
    #[diesel(sql_type = SqlUuid)]
    pub id: Uuid,
    #[diesel(sql_type = SqlUuid)]
    pub user_id: Uuid,
    #[diesel(sql_type = Varchar)]
    pub username: String,
    #[diesel(sql_type = Varchar)]
    pub title: String,
    #[diesel(sql_type = Text)]
    pub content: String,
    #[diesel(sql_type = Array<Text>)]
    pub tags: Vec<String>,
    #[diesel(sql_type = Int4)]
    pub version: i32,
    #[diesel(sql_type = Timestamptz)]
    pub created_at: DateTime<Utc>,
    #[diesel(sql_type = BigInt)]
    pub comment_count: i64,
}

impl TryFrom<FeedRow> for FeedItem {
    type Error = String;

    fn try_from(row: FeedRow) -> Result<Self, Self::Error> {
        Ok(FeedItem {
            id: PostId::from_uuid(row.id),
            author_id: UserId::from_uuid(row.user_id),
            author_username: Username::new(&row.username)
                .map_err(|err| format!("stored username: {err}"))?,
            title: PostTitle::new(&row.title).map_err(|err| format!("stored title: {err}"))?,
            content: PostContent::new(&row.content)
                .map_err(|err| format!("stored content: {err}"))?,
            tags: Tags::new(&row.tags).map_err(|err| format!("stored tags: {err}"))?,
            version: PostVersion::new(row.version),
            created_at: row.created_at,
            comment_count: row.comment_count,
        })
    }
}
