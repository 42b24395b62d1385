//! Deterministic stand-ins for clocks, hashing and notification delivery.

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeDelta, Utc};
use mockable::Clock;

use crate::domain::ports::{
    Notification, Notifier, NotifierError, PasswordHasher, PasswordHasherError,
};
use crate::domain::{PasswordDigest, PlainPassword};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct MutableClock {
    now: Mutex<DateTime<Utc>>,
}

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Move the clock forward by `delta`.
    pub fn advance(&self, delta: TimeDelta) {
        let mut now = lock(&self.now);
        *now += delta;
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *lock(&self.now)
    }
}

/// Notifier that keeps every delivered notification for inspection.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    /// Notifications delivered so far, oldest first.
    pub fn sent(&self) -> Vec<Notification> {
        lock(&self.sent).clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifierError> {
        lock(&self.sent).push(notification.clone());
        Ok(())
    }
}

/// Notifier whose deliveries always fail.
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn send(&self, _notification: &Notification) -> Result<(), NotifierError> {
        Err(NotifierError::delivery("mail relay refused the message"))
    }
}

/// Reversible "hasher" that keeps suites fast. Digests are the password
/// with a `plain$` prefix.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainPasswordHasher;

impl PlainPasswordHasher {
    const PREFIX: &'static str = "plain$";

    /// Digest [`hash`](PasswordHasher::hash) would produce for `password`.
    pub fn digest_for(password: &str) -> PasswordDigest {
        PasswordDigest::new(format!("{}{password}", Self::PREFIX))
    }
}

#[async_trait]
impl PasswordHasher for PlainPasswordHasher {
    async fn hash(&self, password: &PlainPassword) -> Result<PasswordDigest, PasswordHasherError> {
        Ok(Self::digest_for(password.expose()))
    }

    async fn verify(
        &self,
        password: &PlainPassword,
        digest: &PasswordDigest,
    ) -> Result<bool, PasswordHasherError> {
        let stored = digest
            .as_str()
            .strip_prefix(Self::PREFIX)
            .ok_or_else(|| PasswordHasherError::hash("digest was not produced by this hasher"))?;
        Ok(stored == password.expose())
    }
}
