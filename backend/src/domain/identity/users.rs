//! User lookup service.

use std::sync::Arc;

use async_trait::async_trait;

use super::map_user_error;
use crate::domain::ports::{UserRepository, UsersQuery};
use crate::domain::{Error, User, UserId};

/// Implements [`UsersQuery`]. Pending accounts are not visible.
pub struct UsersService<U> {
    users: Arc<U>,
}

impl<U> UsersService<U> {
    pub fn new(users: Arc<U>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl<U> UsersQuery for UsersService<U>
where
    U: UserRepository,
{
    async fn get_user(&self, id: &UserId) -> Result<User, Error> {
        self.users
            .find_by_id(id)
            .await
            .map_err(map_user_error)?
            .filter(User::is_active)
            .ok_or_else(|| Error::not_found("user not found"))
    }
}
