//! Authentication primitives: passwords, activation tokens, and bearer claims.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a port or service.

use std::fmt;

use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use utoipa::ToSchema;
use zeroize::Zeroizing;

use super::user::{EmailAddress, UserId, UserValidationError, Username};

/// Minimum accepted password length in bytes.
pub const PASSWORD_MIN: usize = 3;
/// Maximum accepted password length in bytes.
pub const PASSWORD_MAX: usize = 72;

/// Random bytes in a freshly generated activation token.
const ACTIVATION_TOKEN_BYTES: usize = 32;

/// Domain error returned when credential payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialsValidationError {
    /// Username or email failed validation.
    User(UserValidationError),
    /// Password was blank.
    EmptyPassword,
    /// Password was shorter than [`PASSWORD_MIN`] bytes.
    PasswordTooShort { min: usize },
    /// Password was longer than [`PASSWORD_MAX`] bytes.
    PasswordTooLong { max: usize },
}

impl CredentialsValidationError {
    /// Request field the failure refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::User(inner) => inner.field(),
            _ => "password",
        }
    }

    /// Stable machine-readable failure code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::User(inner) => inner.code(),
            Self::EmptyPassword => "empty_password",
            Self::PasswordTooShort { .. } => "password_too_short",
            Self::PasswordTooLong { .. } => "password_too_long",
        }
    }
}

impl fmt::Display for CredentialsValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User(inner) => inner.fmt(f),
            Self::EmptyPassword => write!(f, "password must not be empty"),
            Self::PasswordTooShort { min } => {
                write!(f, "password must be at least {min} characters")
            }
            Self::PasswordTooLong { max } => {
                write!(f, "password must be at most {max} characters")
            }
        }
    }
}

impl std::error::Error for CredentialsValidationError {}

impl From<UserValidationError> for CredentialsValidationError {
    fn from(value: UserValidationError) -> Self {
        Self::User(value)
    }
}

/// Caller-supplied plaintext password, wiped from memory on drop.
///
/// Whitespace is preserved to avoid surprising credential comparisons.
#[derive(Clone, PartialEq, Eq)]
pub struct PlainPassword(Zeroizing<String>);

impl PlainPassword {
    /// Validate the password length.
    pub fn new(password: &str) -> Result<Self, CredentialsValidationError> {
        if password.is_empty() {
            return Err(CredentialsValidationError::EmptyPassword);
        }
        if password.len() < PASSWORD_MIN {
            return Err(CredentialsValidationError::PasswordTooShort { min: PASSWORD_MIN });
        }
        if password.len() > PASSWORD_MAX {
            return Err(CredentialsValidationError::PasswordTooLong { max: PASSWORD_MAX });
        }
        Ok(Self(Zeroizing::new(password.to_owned())))
    }

    /// Expose the plaintext for hashing or verification.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PlainPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PlainPassword(..)")
    }
}

/// Opaque one-way password digest produced by a password hasher.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordDigest(String);

impl PasswordDigest {
    /// Wrap a stored digest.
    pub fn new(digest: impl Into<String>) -> Self {
        Self(digest.into())
    }

    /// Borrow the encoded digest.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PasswordDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordDigest(..)")
    }
}

/// Validated registration payload.
///
/// # Examples
/// ```
/// use social::domain::RegisterUserRequest;
///
/// let request = RegisterUserRequest::try_from_parts("ada", "ada@example.com", "s3cret")
///     .expect("valid registration");
/// assert_eq!(request.username().as_str(), "ada");
/// ```
#[derive(Debug, Clone)]
pub struct RegisterUserRequest {
    username: Username,
    email: EmailAddress,
    password: PlainPassword,
}

impl RegisterUserRequest {
    /// Validate raw inputs.
    pub fn try_from_parts(
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<Self, CredentialsValidationError> {
        Ok(Self {
            username: Username::new(username)?,
            email: EmailAddress::new(email)?,
            password: PlainPassword::new(password)?,
        })
    }

    /// Requested username.
    pub fn username(&self) -> &Username {
        &self.username
    }

    /// Requested email address.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Requested password.
    pub fn password(&self) -> &PlainPassword {
        &self.password
    }
}

/// Validated login credentials used by the token endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: EmailAddress,
    password: PlainPassword,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, CredentialsValidationError> {
        Ok(Self {
            email: EmailAddress::new(email)?,
            password: PlainPassword::new(password)?,
        })
    }

    /// Email used for the user lookup.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Password provided by the caller.
    pub fn password(&self) -> &PlainPassword {
        &self.password
    }
}

/// Plaintext activation token sent to the user out of band.
///
/// Only its [`TokenHash`] is ever persisted.
#[derive(Clone, PartialEq, Eq)]
pub struct ActivationToken(Zeroizing<String>);

impl ActivationToken {
    /// Generate a cryptographically random token (hex encoded).
    pub fn generate() -> Self {
        let mut bytes = [0_u8; ACTIVATION_TOKEN_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(Zeroizing::new(hex::encode(bytes)))
    }

    /// Wrap a token received from a client.
    pub fn from_plain(token: impl Into<String>) -> Self {
        Self(Zeroizing::new(token.into()))
    }

    /// Expose the plaintext for inclusion in an activation link.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }

    /// SHA-256 digest used for storage and lookup.
    pub fn hash(&self) -> TokenHash {
        let digest = Sha256::digest(self.0.as_bytes());
        TokenHash(hex::encode(digest))
    }
}

impl fmt::Debug for ActivationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ActivationToken(..)")
    }
}

/// Hex-encoded SHA-256 digest of an activation token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TokenHash(String);

impl TokenHash {
    /// Wrap a stored digest.
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    /// Borrow the hex digest.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Claims carried by an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the authenticated user id.
    pub sub: UserId,
    /// Issuer.
    pub iss: String,
    /// Audience (same value as the issuer).
    pub aud: String,
    /// Issued-at, seconds since the epoch.
    pub iat: i64,
    /// Not-before, seconds since the epoch.
    pub nbf: i64,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
}

/// Signed bearer token returned by the login endpoint.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = String)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wrap an encoded token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Borrow the encoded token.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(..)")
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", CredentialsValidationError::EmptyPassword)]
    #[case("ab", CredentialsValidationError::PasswordTooShort { min: PASSWORD_MIN })]
    fn short_passwords_are_rejected(
        #[case] password: &str,
        #[case] expected: CredentialsValidationError,
    ) {
        let err = PlainPassword::new(password).expect_err("invalid password must fail");
        assert_eq!(err, expected);
        assert_eq!(err.field(), "password");
    }

    #[rstest]
    fn password_length_is_measured_in_bytes() {
        // 25 three-byte characters exceed the 72-byte ceiling.
        let password = "€".repeat(25);
        assert_eq!(
            PlainPassword::new(&password),
            Err(CredentialsValidationError::PasswordTooLong { max: PASSWORD_MAX })
        );
    }

    #[rstest]
    fn registration_reports_the_first_invalid_field() {
        let err = RegisterUserRequest::try_from_parts("ada", "not-an-email", "secret")
            .expect_err("invalid email must fail");
        assert_eq!(err.field(), "email");
        assert_eq!(err.code(), "invalid_email");
    }

    #[rstest]
    fn generated_tokens_are_unique_and_hex() {
        let first = ActivationToken::generate();
        let second = ActivationToken::generate();
        assert_ne!(first.expose(), second.expose());
        assert_eq!(first.expose().len(), ACTIVATION_TOKEN_BYTES * 2);
        assert!(first.expose().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[rstest]
    fn token_hash_is_sha256_hex_of_plaintext() {
        let token = ActivationToken::from_plain("abc");
        assert_eq!(
            token.hash().as_str(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[rstest]
    fn secrets_are_redacted_in_debug_output() {
        let password = PlainPassword::new("hunter2").expect("valid password");
        let token = ActivationToken::from_plain("plaintext-token");
        assert!(!format!("{password:?}").contains("hunter2"));
        assert!(!format!("{token:?}").contains("plaintext-token"));
    }
}
