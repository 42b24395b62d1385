//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};
use chrono::{TimeZone, Utc};

use crate::domain::ports::{
    MockAuthenticator, MockFollowCommand, MockLoginService, MockPostsCommand, MockPostsQuery,
    MockRegistrationCommand, MockUserFeedQuery, MockUsersQuery,
};
use crate::domain::{EmailAddress, Role, RoleLevel, RoleName, User, UserId, Username};
use crate::inbound::http::state::HttpState;

/// One mock per driving port. Mocks without expectations panic when
/// called, so tests only configure the ports a handler should touch.
#[derive(Default)]
pub struct TestPorts {
    pub registration: MockRegistrationCommand,
    pub login: MockLoginService,
    pub authenticator: MockAuthenticator,
    pub users: MockUsersQuery,
    pub feed: MockUserFeedQuery,
    pub follows: MockFollowCommand,
    pub posts: MockPostsCommand,
    pub posts_query: MockPostsQuery,
}

impl TestPorts {
    /// Ports whose authenticator accepts any token as `caller`.
    pub fn authenticated_as(caller: User) -> Self {
        let mut ports = Self::default();
        ports
            .authenticator
            .expect_authenticate()
            .returning(move |_| Ok(caller.clone()));
        ports
    }

    pub fn into_state(self) -> HttpState {
        HttpState {
            registration: Arc::new(self.registration),
            login: Arc::new(self.login),
            authenticator: Arc::new(self.authenticator),
            users: Arc::new(self.users),
            feed: Arc::new(self.feed),
            follows: Arc::new(self.follows),
            posts: Arc::new(self.posts),
            posts_query: Arc::new(self.posts_query),
        }
    }
}

/// An `/api/v1`-scoped app wired to `ports`; `configure` registers the
/// handlers under test.
pub fn test_app<F>(
    ports: TestPorts,
    configure: F,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
>
where
    F: FnOnce(&mut web::ServiceConfig),
{
    App::new()
        .app_data(web::Data::new(ports.into_state()))
        .service(web::scope("/api/v1").configure(configure))
}

/// An active user with the base role.
pub fn sample_user(username: &str) -> User {
    User::new(
        UserId::random(),
        Username::new(username).expect("valid username"),
        EmailAddress::new(format!("{username}@example.com")).expect("valid email"),
        Role::new(RoleName::user(), "regular user", RoleLevel::new(1)),
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
            .single()
            .expect("valid timestamp"),
    )
    .activated()
}
