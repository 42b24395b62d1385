//! Port for one-way password hashing.

use async_trait::async_trait;

use crate::domain::{PasswordDigest, PlainPassword};

use super::define_port_error;

define_port_error! {
    /// Errors raised by password hashing adapters.
    pub enum PasswordHasherError {
        /// Hashing or digest parsing failed.
        Hash { message: String } => "password hashing failed: {message}",
    }
}

/// Salted, deliberately slow one-way hash capability.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    /// Derive a digest for storage.
    async fn hash(&self, password: &PlainPassword) -> Result<PasswordDigest, PasswordHasherError>;

    /// Check a candidate password against a stored digest.
    async fn verify(
        &self,
        password: &PlainPassword,
        digest: &PasswordDigest,
    ) -> Result<bool, PasswordHasherError>;
}
