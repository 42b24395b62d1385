//! Port for out-of-band user notifications (e.g. email).

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::domain::EmailAddress;

use super::define_port_error;

define_port_error! {
    /// Errors raised by notifier adapters.
    pub enum NotifierError {
        /// Delivery was attempted and failed.
        Delivery { message: String } => "notification delivery failed: {message}",
    }
}

/// Message templates known to notifier adapters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationTemplate {
    /// Welcome message carrying the activation link.
    UserInvitation,
}

impl NotificationTemplate {
    /// Template identifier.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UserInvitation => "user_invitation",
        }
    }
}

/// A message to deliver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub template: NotificationTemplate,
    pub recipient: EmailAddress,
    /// Template variables.
    pub vars: BTreeMap<String, String>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver `notification`.
    async fn send(&self, notification: &Notification) -> Result<(), NotifierError>;
}
