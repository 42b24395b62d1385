//! Shared helpers for the integration suites.
//!
//! Wires every driving port over [`InMemoryStore`] with a controllable
//! clock and a notifier that records invitations instead of sending them.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use mockable::Clock;
use url::Url;

use social::domain::ports::RegisteredUser;
use social::domain::{
    AccessToken, EmailAddress, LoginCredentials, RegisterUserRequest, RoleName, User, Username,
};
use social::inbound::http::state::HttpState;
use social::test_support::{
    InMemoryStore, MutableClock, PlainPasswordHasher, RecordingNotifier, http_state,
};

pub const PASSWORD: &str = "correct horse";

pub struct Harness {
    pub store: InMemoryStore,
    pub clock: Arc<MutableClock>,
    pub notifier: Arc<RecordingNotifier>,
    pub state: HttpState,
}

impl Harness {
    /// A harness whose clock starts at the current instant. Bearer tokens
    /// are checked against the wall clock, so this keeps them valid.
    pub fn new() -> Self {
        Self::starting_at(Utc::now())
    }

    pub fn starting_at(now: DateTime<Utc>) -> Self {
        let clock = Arc::new(MutableClock::new(now));
        let dyn_clock: Arc<dyn Clock> = clock.clone();
        let store = InMemoryStore::new(dyn_clock.clone());
        let notifier = Arc::new(RecordingNotifier::default());
        let state = http_state(
            &store,
            notifier.clone(),
            dyn_clock,
            Url::parse("https://social.example").expect("valid url"),
        );
        Self {
            store,
            clock,
            notifier,
            state,
        }
    }

    /// Insert an active account holding `role`.
    pub fn seed_user(&self, name: &str, role: &RoleName) -> User {
        self.store
            .insert_active_user(
                Username::new(name).expect("valid username"),
                EmailAddress::new(format!("{name}@example.com")).expect("valid email"),
                PlainPasswordHasher::digest_for(PASSWORD),
                role,
            )
            .expect("seed user")
    }

    /// Register `name` through the registration port.
    pub async fn register(&self, name: &str) -> RegisteredUser {
        let request =
            RegisterUserRequest::try_from_parts(name, &format!("{name}@example.com"), PASSWORD)
                .expect("valid registration");
        self.state
            .registration
            .register(&request)
            .await
            .expect("registration succeeds")
    }

    pub async fn login(&self, name: &str) -> Result<AccessToken, social::domain::Error> {
        let credentials =
            LoginCredentials::try_from_parts(&format!("{name}@example.com"), PASSWORD)
                .expect("valid credentials");
        self.state.login.issue_token(&credentials).await
    }
}
