//! HS256 JSON Web Token implementation of the [`TokenIssuer`] port.

use std::fmt;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::domain::ports::{TokenIssuer, TokenIssuerError};
use crate::domain::{AccessToken, Claims};

/// Signs and verifies bearer tokens with a shared secret.
///
/// Verification checks the signature, `exp`, `nbf`, and that both `iss` and
/// `aud` equal the configured issuer.
pub struct JwtTokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl JwtTokenIssuer {
    /// Build an issuer for `issuer` signing with `secret`.
    pub fn new(secret: &[u8], issuer: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[issuer]);
        validation.set_audience(&[issuer]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        validation.validate_nbf = true;
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }
}

impl fmt::Debug for JwtTokenIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtTokenIssuer").finish_non_exhaustive()
    }
}

impl TokenIssuer for JwtTokenIssuer {
    fn issue(&self, claims: &Claims) -> Result<AccessToken, TokenIssuerError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map(AccessToken::new)
            .map_err(|err| TokenIssuerError::signing(err.to_string()))
    }

    fn verify(&self, token: &str) -> Result<Claims, TokenIssuerError> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|err| TokenIssuerError::invalid(err.to_string()))
    }
}
