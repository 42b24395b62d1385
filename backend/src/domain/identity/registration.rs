//! Registration and activation service.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::TimeDelta;
use mockable::Clock;
use tracing::{error, info, warn};
use url::Url;

use super::{map_hasher_error, map_user_error};
use crate::domain::ports::{
    Invitation, NewUser, Notification, NotificationTemplate, Notifier, PasswordHasher,
    RegisteredUser, RegistrationCommand, UserRepository, UserRepositoryError,
};
use crate::domain::{ActivationToken, Error, RegisterUserRequest, RoleName, UserId};

/// Invitation lifetime and the frontend that hosts the activation page.
#[derive(Debug, Clone)]
pub struct RegistrationPolicy {
    invitation_ttl: TimeDelta,
    frontend_url: Url,
}

impl RegistrationPolicy {
    pub fn new(invitation_ttl: TimeDelta, frontend_url: Url) -> Self {
        Self {
            invitation_ttl,
            frontend_url,
        }
    }

    pub fn invitation_ttl(&self) -> TimeDelta {
        self.invitation_ttl
    }

    /// `{frontend_url}/confirm/{token}`.
    pub fn activation_url(&self, token: &ActivationToken) -> Result<Url, Error> {
        let mut url = self.frontend_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::internal("frontend url cannot carry a path"))?
            .pop_if_empty()
            .push("confirm")
            .push(token.expose());
        Ok(url)
    }
}

/// Implements [`RegistrationCommand`].
///
/// Registration is all-or-nothing from the caller's point of view: when the
/// invitation cannot be delivered the pending user is deleted again.
pub struct RegistrationService<U, H, N> {
    users: Arc<U>,
    hasher: Arc<H>,
    notifier: Arc<N>,
    clock: Arc<dyn Clock>,
    policy: RegistrationPolicy,
}

impl<U, H, N> RegistrationService<U, H, N> {
    pub fn new(
        users: Arc<U>,
        hasher: Arc<H>,
        notifier: Arc<N>,
        clock: Arc<dyn Clock>,
        policy: RegistrationPolicy,
    ) -> Self {
        Self {
            users,
            hasher,
            notifier,
            clock,
            policy,
        }
    }
}

impl<U, H, N> RegistrationService<U, H, N>
where
    U: UserRepository,
{
    async fn compensate(&self, id: &UserId) {
        if let Err(err) = self.users.delete(id).await {
            error!(user_id = %id, error = %err, "failed to remove user after invitation failure");
        }
    }
}

#[async_trait]
impl<U, H, N> RegistrationCommand for RegistrationService<U, H, N>
where
    U: UserRepository,
    H: PasswordHasher,
    N: Notifier,
{
    async fn register(&self, request: &RegisterUserRequest) -> Result<RegisteredUser, Error> {
        let password = self
            .hasher
            .hash(request.password())
            .await
            .map_err(map_hasher_error)?;
        let token = ActivationToken::generate();
        let activation_url = self.policy.activation_url(&token)?;

        let new_user = NewUser {
            id: UserId::random(),
            username: request.username().clone(),
            email: request.email().clone(),
            password,
            role: RoleName::user(),
        };
        let invitation = Invitation {
            token_hash: token.hash(),
            expires_at: self.clock.utc() + self.policy.invitation_ttl,
        };
        let user = self
            .users
            .create_and_invite(&new_user, &invitation)
            .await
            .map_err(map_user_error)?;

        let notification = Notification {
            template: NotificationTemplate::UserInvitation,
            recipient: user.email().clone(),
            vars: BTreeMap::from([
                ("username".to_owned(), user.username().to_string()),
                ("activation_url".to_owned(), activation_url.to_string()),
            ]),
        };
        if let Err(err) = self.notifier.send(&notification).await {
            warn!(user_id = %user.id(), error = %err, "invitation delivery failed; removing user");
            self.compensate(user.id()).await;
            return Err(Error::internal("failed to deliver activation invitation"));
        }

        info!(user_id = %user.id(), "user registered");
        Ok(RegisteredUser { user, token })
    }

    async fn activate(&self, token: &ActivationToken) -> Result<(), Error> {
        let user_id = self
            .users
            .activate(&token.hash(), self.clock.utc())
            .await
            .map_err(|err| match err {
                UserRepositoryError::NotFound => Error::not_found("invitation not found"),
                other => map_user_error(other),
            })?;
        info!(%user_id, "user activated");
        Ok(())
    }
}

#[cfg(test)]
#[path = "registration_tests.rs"]
mod tests;
