//! Domain primitives, aggregates, ports and services.
//!
//! Purpose: define the strongly typed entities used by the API and
//! persistence layers and the use-case services that operate on them.
//! Types are immutable once validated; invariants and serialisation
//! contracts (serde) are documented on each type.
//!
//! Public surface:
//! - Error / ErrorCode: API error payload and stable identifier.
//! - User, Role, Post, Comment, FeedItem: aggregates returned by use-cases.
//! - ports: driving and driven port traits.
//! - RegistrationService, AuthService, UsersService, PostService,
//!   FeedService, FollowService: driving port implementations.

pub mod auth;
pub mod authorization;
pub mod comment;
pub mod error;
pub mod feed;
pub mod feed_service;
pub mod follow_service;
pub mod identity;
mod identifier;
pub mod ports;
pub mod post;
pub mod post_service;
pub mod role;
pub mod role_hierarchy;
pub mod trace_id;
pub mod user;

pub use self::auth::{
    AccessToken, ActivationToken, Claims, CredentialsValidationError, LoginCredentials,
    PASSWORD_MAX, PASSWORD_MIN, PasswordDigest, PlainPassword, RegisterUserRequest, TokenHash,
};
pub use self::authorization::AuthorizationGate;
pub use self::comment::{Comment, CommentContent, CommentId, NewComment};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::feed::{
    FEED_LIMIT_MAX, FEED_SEARCH_MAX, FEED_TAGS_MAX, FeedItem, FeedQuery, FeedQueryError,
    SortDirection,
};
pub use self::feed_service::FeedService;
pub use self::follow_service::FollowService;
pub use self::identifier::IdentifierError;
pub use self::identity::{
    AuthService, RegistrationPolicy, RegistrationService, TokenPolicy, UsersService,
};
pub use self::post::{
    CONTENT_MAX, NewPost, Post, PostContent, PostId, PostParts, PostPatch, PostTitle, PostUpdate,
    PostValidationError, PostVersion, TAG_MAX, TAGS_MAX, TITLE_MAX, Tags, VersionExhausted,
};
pub use self::post_service::PostService;
pub use self::role::{Role, RoleLevel, RoleName, RoleValidationError};
pub use self::role_hierarchy::RoleHierarchy;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    EMAIL_MAX, EmailAddress, USERNAME_MAX, User, UserId, UserValidationError, Username,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use social::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::forbidden("nope"))
/// }
/// # assert!(handler().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
