//! Port abstraction for the identity store and its errors.
//!
//! The identity store owns the registration → invitation → activation
//! lifecycle. Adapters must make each lifecycle step a single atomic unit:
//! either every row it touches changes or none does.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    EmailAddress, PasswordDigest, RoleName, TokenHash, User, UserId, Username,
};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserRepositoryError storage = "user repository" {
        /// The email unique constraint rejected the insert.
        DuplicateEmail => "a user with that email already exists",
        /// The username unique constraint rejected the insert.
        DuplicateUsername => "a user with that username already exists",
        /// No matching row (absent user, or unknown/expired invitation).
        NotFound => "user record not found",
        /// The requested role does not exist in the role table.
        UnknownRole { role: String } => "role {role} is not defined",
    }
}

/// A user row about to be inserted in the pending (inactive) state.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Identifier assigned by the caller.
    pub id: UserId,
    /// Requested unique handle.
    pub username: Username,
    /// Requested unique email.
    pub email: EmailAddress,
    /// One-way password digest.
    pub password: PasswordDigest,
    /// Role to assign, resolved to its row by the adapter.
    pub role: RoleName,
}

/// Activation invitation stored alongside a new user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invitation {
    /// SHA-256 digest of the plaintext token.
    pub token_hash: TokenHash,
    /// Moment after which the invitation can no longer be redeemed.
    pub expires_at: DateTime<Utc>,
}

/// An active user together with their password digest, for login checks.
#[derive(Debug, Clone)]
pub struct StoredCredentials {
    /// The active user.
    pub user: User,
    /// Stored password digest.
    pub password: PasswordDigest,
}

/// Port for user persistence.
///
/// # Atomicity
///
/// - [`create_and_invite`](Self::create_and_invite) inserts the user and
///   the invitation together.
/// - [`activate`](Self::activate) flips the active flag and deletes every
///   invitation of that user together.
/// - [`delete`](Self::delete) removes the user and its invitations
///   together; it is the compensation for a failed post-registration step.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a pending user and its invitation.
    ///
    /// Fails with [`UserRepositoryError::DuplicateEmail`] or
    /// [`UserRepositoryError::DuplicateUsername`] on unique-constraint
    /// violations, leaving no rows behind.
    async fn create_and_invite(
        &self,
        user: &NewUser,
        invitation: &Invitation,
    ) -> Result<User, UserRepositoryError>;

    /// Redeem the invitation whose digest is `token_hash` and that is still
    /// valid at `now`.
    ///
    /// Unknown and expired invitations both yield
    /// [`UserRepositoryError::NotFound`].
    async fn activate(
        &self,
        token_hash: &TokenHash,
        now: DateTime<Utc>,
    ) -> Result<UserId, UserRepositoryError>;

    /// Remove a user and any outstanding invitations.
    async fn delete(&self, id: &UserId) -> Result<(), UserRepositoryError>;

    /// Fetch a user (active or pending) by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError>;

    /// Fetch an active user's credentials by email.
    async fn find_credentials_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<StoredCredentials>, UserRepositoryError>;
}
