//! Driving port for the registration and activation lifecycle.
//!
//! Inbound adapters call this port to create pending accounts and redeem
//! activation tokens without knowing how identities are stored or how
//! invitations are delivered.

use async_trait::async_trait;

use crate::domain::{ActivationToken, Error, RegisterUserRequest, User};

/// A freshly registered, still inactive user together with the plaintext
/// activation token that was sent to them.
#[derive(Debug, Clone)]
pub struct RegisteredUser {
    pub user: User,
    pub token: ActivationToken,
}

/// Domain use-case port for account registration.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RegistrationCommand: Send + Sync {
    /// Register a pending user, persist the invitation and notify the user.
    ///
    /// When notification fails the user is removed again and the call
    /// reports an internal error.
    async fn register(&self, request: &RegisterUserRequest) -> Result<RegisteredUser, Error>;

    /// Redeem an activation token. Unknown or expired tokens yield
    /// `not_found`.
    async fn activate(&self, token: &ActivationToken) -> Result<(), Error>;
}
