//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (repositories, hashing, signing, notification) describe what
//! the domain needs from infrastructure; each exposes a typed error enum so
//! adapters map failures into predictable variants. Driving ports describe
//! the use-cases inbound adapters may call and speak the domain
//! [`Error`](crate::domain::Error) directly.

mod macros;
pub(crate) use macros::define_port_error;

mod comment_repository;
mod feed_repository;
mod follow_command;
mod follower_repository;
mod login_service;
mod notifier;
mod password_hasher;
mod post_repository;
mod posts_command;
mod registration_command;
mod role_repository;
mod token_issuer;
mod user_feed_query;
mod user_repository;
mod users_query;

#[cfg(test)]
pub use comment_repository::MockCommentRepository;
pub use comment_repository::{CommentRepository, CommentRepositoryError};
#[cfg(test)]
pub use feed_repository::MockFeedRepository;
pub use feed_repository::{FeedRepository, FeedRepositoryError};
#[cfg(test)]
pub use follow_command::MockFollowCommand;
pub use follow_command::FollowCommand;
#[cfg(test)]
pub use follower_repository::MockFollowerRepository;
pub use follower_repository::{FollowerRepository, FollowerRepositoryError};
#[cfg(test)]
pub use login_service::{MockAuthenticator, MockLoginService};
pub use login_service::{Authenticator, LoginService};
#[cfg(test)]
pub use notifier::MockNotifier;
pub use notifier::{Notification, NotificationTemplate, Notifier, NotifierError};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHasher, PasswordHasherError};
#[cfg(test)]
pub use post_repository::MockPostRepository;
pub use post_repository::{PostRepository, PostRepositoryError};
#[cfg(test)]
pub use posts_command::{MockPostsCommand, MockPostsQuery};
pub use posts_command::{CreatePostRequest, PostsCommand, PostsQuery, UpdatePostRequest};
#[cfg(test)]
pub use registration_command::MockRegistrationCommand;
pub use registration_command::{RegisteredUser, RegistrationCommand};
#[cfg(test)]
pub use role_repository::MockRoleRepository;
pub use role_repository::{RoleRepository, RoleRepositoryError};
#[cfg(test)]
pub use token_issuer::MockTokenIssuer;
pub use token_issuer::{TokenIssuer, TokenIssuerError};
#[cfg(test)]
pub use user_feed_query::MockUserFeedQuery;
pub use user_feed_query::UserFeedQuery;
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{
    Invitation, NewUser, StoredCredentials, UserRepository, UserRepositoryError,
};
#[cfg(test)]
pub use users_query::MockUsersQuery;
pub use users_query::UsersQuery;
