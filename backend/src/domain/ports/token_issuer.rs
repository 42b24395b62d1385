//! Port for issuing and verifying bearer tokens.

use crate::domain::{AccessToken, Claims};

use super::define_port_error;

define_port_error! {
    /// Errors raised by token adapters.
    pub enum TokenIssuerError {
        /// The token could not be signed.
        Signing { message: String } => "token signing failed: {message}",
        /// The token is malformed, forged, expired, or meant for someone else.
        Invalid { message: String } => "token rejected: {message}",
    }
}

/// Opaque token capability; signing internals stay in the adapter.
#[cfg_attr(test, mockall::automock)]
pub trait TokenIssuer: Send + Sync {
    /// Sign `claims` into a bearer token.
    fn issue(&self, claims: &Claims) -> Result<AccessToken, TokenIssuerError>;

    /// Verify a bearer token and return its claims.
    fn verify(&self, token: &str) -> Result<Claims, TokenIssuerError>;
}
