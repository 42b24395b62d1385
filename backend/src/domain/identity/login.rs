//! Login and bearer authentication service.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::TimeDelta;
use mockable::Clock;
use tracing::debug;

use super::{map_hasher_error, map_user_error};
use crate::domain::ports::{
    Authenticator, LoginService, PasswordHasher, TokenIssuer, TokenIssuerError, UserRepository,
};
use crate::domain::{AccessToken, Claims, Error, LoginCredentials, User};

/// Issuer name (also used as audience) and token lifetime.
#[derive(Debug, Clone)]
pub struct TokenPolicy {
    issuer: String,
    ttl: TimeDelta,
}

impl TokenPolicy {
    pub fn new(issuer: impl Into<String>, ttl: TimeDelta) -> Self {
        Self {
            issuer: issuer.into(),
            ttl,
        }
    }

    pub fn issuer(&self) -> &str {
        self.issuer.as_str()
    }
}

/// Implements [`LoginService`] and [`Authenticator`].
pub struct AuthService<U, H, T> {
    users: Arc<U>,
    hasher: Arc<H>,
    tokens: Arc<T>,
    clock: Arc<dyn Clock>,
    policy: TokenPolicy,
}

impl<U, H, T> AuthService<U, H, T> {
    pub fn new(
        users: Arc<U>,
        hasher: Arc<H>,
        tokens: Arc<T>,
        clock: Arc<dyn Clock>,
        policy: TokenPolicy,
    ) -> Self {
        Self {
            users,
            hasher,
            tokens,
            clock,
            policy,
        }
    }

    fn claims_for(&self, user: &User) -> Claims {
        let now = self.clock.utc().timestamp();
        Claims {
            sub: *user.id(),
            iss: self.policy.issuer.clone(),
            aud: self.policy.issuer.clone(),
            iat: now,
            nbf: now,
            exp: now + self.policy.ttl.num_seconds(),
        }
    }
}

fn invalid_credentials() -> Error {
    Error::unauthorized("invalid credentials")
}

fn invalid_token() -> Error {
    Error::unauthorized("invalid token")
}

fn map_signing_error(error: TokenIssuerError) -> Error {
    Error::internal(format!("token issuance failed: {error}"))
}

#[async_trait]
impl<U, H, T> LoginService for AuthService<U, H, T>
where
    U: UserRepository,
    H: PasswordHasher,
    T: TokenIssuer,
{
    async fn issue_token(&self, credentials: &LoginCredentials) -> Result<AccessToken, Error> {
        let Some(stored) = self
            .users
            .find_credentials_by_email(credentials.email())
            .await
            .map_err(map_user_error)?
        else {
            debug!("login for unknown or inactive email");
            return Err(invalid_credentials());
        };
        if !stored.user.is_active() {
            return Err(invalid_credentials());
        }

        let matches = self
            .hasher
            .verify(credentials.password(), &stored.password)
            .await
            .map_err(map_hasher_error)?;
        if !matches {
            debug!(user_id = %stored.user.id(), "login with wrong password");
            return Err(invalid_credentials());
        }

        self.tokens
            .issue(&self.claims_for(&stored.user))
            .map_err(map_signing_error)
    }
}

#[async_trait]
impl<U, H, T> Authenticator for AuthService<U, H, T>
where
    U: UserRepository,
    H: PasswordHasher,
    T: TokenIssuer,
{
    async fn authenticate(&self, token: &str) -> Result<User, Error> {
        let claims = self.tokens.verify(token).map_err(|err| {
            debug!(error = %err, "bearer token rejected");
            invalid_token()
        })?;
        self.users
            .find_by_id(&claims.sub)
            .await
            .map_err(map_user_error)?
            .filter(User::is_active)
            .ok_or_else(invalid_token)
    }
}
