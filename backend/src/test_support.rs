//! Test utilities for the backend crate.
//!
//! Compiled for unit tests and, through the `test-support` feature, for the
//! integration suites under `tests/`. Everything here trades durability and
//! security for determinism; none of it belongs in a production wiring.

mod doubles;
mod memory;

use std::sync::Arc;

use chrono::TimeDelta;
use mockable::Clock;
use url::Url;

pub use doubles::{FailingNotifier, MutableClock, PlainPasswordHasher, RecordingNotifier};
pub use memory::InMemoryStore;

use crate::domain::ports::Notifier;
use crate::domain::{
    AuthService, FeedService, FollowService, PostService, RegistrationPolicy, RegistrationService,
    TokenPolicy, UsersService,
};
use crate::inbound::http::state::HttpState;
use crate::outbound::security::JwtTokenIssuer;

/// Signing secret used by [`http_state`].
pub const TEST_JWT_SECRET: &[u8] = b"test-support-signing-secret";
/// Issuer and audience used by [`http_state`].
pub const TEST_JWT_ISSUER: &str = "social-tests";

/// Wire every domain service over `store` the way the server does over
/// PostgreSQL, using the plain hasher and a JWT issuer keyed with
/// [`TEST_JWT_SECRET`]. Activation links point at `frontend_url`.
pub fn http_state<N>(
    store: &InMemoryStore,
    notifier: Arc<N>,
    clock: Arc<dyn Clock>,
    frontend_url: Url,
) -> HttpState
where
    N: Notifier + 'static,
{
    let repo = Arc::new(store.clone());
    let hasher = Arc::new(PlainPasswordHasher);
    let tokens = Arc::new(JwtTokenIssuer::new(TEST_JWT_SECRET, TEST_JWT_ISSUER));
    let auth = Arc::new(AuthService::new(
        repo.clone(),
        hasher.clone(),
        tokens,
        clock.clone(),
        TokenPolicy::new(TEST_JWT_ISSUER, TimeDelta::hours(1)),
    ));
    let posts = Arc::new(PostService::new(repo.clone(), repo.clone(), repo.clone()));
    HttpState {
        registration: Arc::new(RegistrationService::new(
            repo.clone(),
            hasher,
            notifier,
            clock,
            RegistrationPolicy::new(TimeDelta::hours(72), frontend_url),
        )),
        login: auth.clone(),
        authenticator: auth,
        users: Arc::new(UsersService::new(repo.clone())),
        feed: Arc::new(FeedService::new(repo.clone())),
        follows: Arc::new(FollowService::new(repo)),
        posts: posts.clone(),
        posts_query: posts,
    }
}
