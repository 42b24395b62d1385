//! Driving ports for login and bearer authentication.
//!
//! Inbound adapters exchange credentials for a token through
//! [`LoginService`] and resolve incoming bearer tokens through
//! [`Authenticator`]; neither needs to know about hashing or signing.

use async_trait::async_trait;

use crate::domain::{AccessToken, Error, LoginCredentials, User};

/// Domain use-case port for issuing access tokens.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and return a signed access token.
    ///
    /// Unknown emails, inactive users and wrong passwords are
    /// indistinguishable: all yield `unauthorized`.
    async fn issue_token(&self, credentials: &LoginCredentials) -> Result<AccessToken, Error>;
}

/// Domain use-case port for resolving bearer tokens.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Verify `token` and load the active user it names.
    async fn authenticate(&self, token: &str) -> Result<User, Error>;
}
