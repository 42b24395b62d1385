//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    Authenticator, FollowCommand, LoginService, PostsCommand, PostsQuery, RegistrationCommand,
    UserFeedQuery, UsersQuery,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub registration: Arc<dyn RegistrationCommand>,
    pub login: Arc<dyn LoginService>,
    pub authenticator: Arc<dyn Authenticator>,
    pub users: Arc<dyn UsersQuery>,
    pub feed: Arc<dyn UserFeedQuery>,
    pub follows: Arc<dyn FollowCommand>,
    pub posts: Arc<dyn PostsCommand>,
    pub posts_query: Arc<dyn PostsQuery>,
}
