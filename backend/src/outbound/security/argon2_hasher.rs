//! Argon2id implementation of the [`PasswordHasher`] port.
//!
//! Hashing is CPU bound and deliberately slow, so both operations run on the
//! blocking thread pool rather than the async executor.

use argon2::{Argon2, PasswordHasher as _, PasswordVerifier as _};
use async_trait::async_trait;
use password_hash::{PasswordHash, SaltString};
use rand::RngCore;
use tokio::task;
use zeroize::Zeroizing;

use crate::domain::ports::{PasswordHasher, PasswordHasherError};
use crate::domain::{PasswordDigest, PlainPassword};

const SALT_BYTES: usize = 16;

/// Password hasher producing PHC-encoded Argon2id digests.
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2PasswordHasher;

impl Argon2PasswordHasher {
    pub const fn new() -> Self {
        Self
    }
}

fn hash_blocking(password: &str) -> Result<PasswordDigest, PasswordHasherError> {
    let mut salt_bytes = [0_u8; SALT_BYTES];
    rand::thread_rng().fill_bytes(&mut salt_bytes);
    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|err| PasswordHasherError::hash(err.to_string()))?;
    let phc = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| PasswordHasherError::hash(err.to_string()))?;
    Ok(PasswordDigest::new(phc.to_string()))
}

fn verify_blocking(password: &str, digest: &str) -> Result<bool, PasswordHasherError> {
    let parsed =
        PasswordHash::new(digest).map_err(|err| PasswordHasherError::hash(err.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

fn join_error(err: task::JoinError) -> PasswordHasherError {
    PasswordHasherError::hash(format!("hashing task failed: {err}"))
}

#[async_trait]
impl PasswordHasher for Argon2PasswordHasher {
    async fn hash(&self, password: &PlainPassword) -> Result<PasswordDigest, PasswordHasherError> {
        let plain = Zeroizing::new(password.expose().to_owned());
        task::spawn_blocking(move || hash_blocking(&plain))
            .await
            .map_err(join_error)?
    }

    async fn verify(
        &self,
        password: &PlainPassword,
        digest: &PasswordDigest,
    ) -> Result<bool, PasswordHasherError> {
        let plain = Zeroizing::new(password.expose().to_owned());
        let encoded = digest.as_str().to_owned();
        task::spawn_blocking(move || verify_blocking(&plain, &encoded))
            .await
            .map_err(join_error)?
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;

    fn password(raw: &str) -> PlainPassword {
        PlainPassword::new(raw).expect("valid password")
    }

    #[tokio::test]
    async fn digests_verify_only_the_original_password() {
        let hasher = Argon2PasswordHasher::new();
        let digest = hasher.hash(&password("correct horse")).await.expect("hash");

        assert!(digest.as_str().starts_with("$argon2id$"));
        assert!(
            hasher
                .verify(&password("correct horse"), &digest)
                .await
                .expect("verify")
        );
        assert!(
            !hasher
                .verify(&password("battery staple"), &digest)
                .await
                .expect("verify")
        );
    }

    #[tokio::test]
    async fn salts_differ_between_hashes() {
        let hasher = Argon2PasswordHasher::new();
        let first = hasher.hash(&password("same")).await.expect("hash");
        let second = hasher.hash(&password("same")).await.expect("hash");
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn malformed_digest_is_an_error() {
        let hasher = Argon2PasswordHasher::new();
        let err = hasher
            .verify(&password("anything"), &PasswordDigest::new("not-a-phc-string"))
            .await
            .expect_err("malformed digest must fail");
        assert!(matches!(err, PasswordHasherError::Hash { .. }));
    }
}
