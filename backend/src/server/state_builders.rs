//! Builders wiring PostgreSQL adapters into the HTTP state.

use std::sync::Arc;

use mockable::{Clock, DefaultClock};

use social::domain::ports::{PostsCommand, PostsQuery, RoleRepository};
use social::domain::{
    AuthService, FeedService, FollowService, PostService, RegistrationPolicy, RegistrationService,
    TokenPolicy, UsersService,
};
use social::inbound::http::state::HttpState;
use social::outbound::cache::CachingRoleRepository;
use social::outbound::notify::TracingNotifier;
use social::outbound::persistence::{
    DbPool, DieselCommentRepository, DieselFeedRepository, DieselFollowerRepository,
    DieselPostRepository, DieselRoleRepository, DieselUserRepository,
};
use social::outbound::security::{Argon2PasswordHasher, JwtTokenIssuer};

use super::RuntimeConfig;

type PostPorts = (Arc<dyn PostsCommand>, Arc<dyn PostsQuery>);

/// Build the post service over `roles`, which may or may not be cached.
fn build_post_ports<R>(pool: &DbPool, roles: Arc<R>) -> PostPorts
where
    R: RoleRepository + 'static,
{
    let service = Arc::new(PostService::new(
        Arc::new(DieselPostRepository::new(pool.clone())),
        Arc::new(DieselCommentRepository::new(pool.clone())),
        roles,
    ));
    (service.clone(), service)
}

/// Assemble every driving port over the shared pool.
pub(super) fn build_http_state(pool: &DbPool, config: &RuntimeConfig) -> HttpState {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let users = Arc::new(DieselUserRepository::new(pool.clone()));
    let hasher = Arc::new(Argon2PasswordHasher::new());
    let tokens = Arc::new(JwtTokenIssuer::new(
        config.jwt_secret.as_bytes(),
        &config.jwt_issuer,
    ));

    let auth = Arc::new(AuthService::new(
        users.clone(),
        hasher.clone(),
        tokens,
        clock.clone(),
        TokenPolicy::new(config.jwt_issuer.clone(), config.jwt_ttl),
    ));

    let roles = DieselRoleRepository::new(pool.clone());
    let (posts, posts_query) = if config.role_cache {
        build_post_ports(pool, Arc::new(CachingRoleRepository::new(roles)))
    } else {
        build_post_ports(pool, Arc::new(roles))
    };

    HttpState {
        registration: Arc::new(RegistrationService::new(
            users.clone(),
            hasher,
            Arc::new(TracingNotifier),
            clock,
            RegistrationPolicy::new(config.invitation_ttl, config.frontend_url.clone()),
        )),
        login: auth.clone(),
        authenticator: auth,
        users: Arc::new(UsersService::new(users)),
        feed: Arc::new(FeedService::new(Arc::new(DieselFeedRepository::new(
            pool.clone(),
        )))),
        follows: Arc::new(FollowService::new(Arc::new(DieselFollowerRepository::new(
            pool.clone(),
        )))),
        posts,
        posts_query,
    }
}
