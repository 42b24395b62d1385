//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! Registration, activation and deletion each run in a single transaction.
//! Unique-constraint violations are classified by constraint name so the
//! domain can tell duplicate emails from duplicate usernames.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use tracing::warn;

use crate::domain::ports::{
    Invitation, NewUser, StoredCredentials, UserRepository, UserRepositoryError,
};
use crate::domain::{EmailAddress, PasswordDigest, TokenHash, User, UserId};

use super::diesel_helpers::{DieselFailure, classify, map_pool_error_message};
use super::models::{NewInvitationRow, NewUserRow, RoleRow, UserRow};
use super::pool::{DbPool, PoolError, with_timeout};
use super::schema::{roles, user_invitations, users};

const EMAIL_CONSTRAINT: &str = "users_email_key";
const USERNAME_CONSTRAINT: &str = "users_username_key";

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use social::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};
    ///
    /// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
    /// let pool = DbPool::new(PoolConfig::new("postgres://localhost/social")).await?;
    /// let repository = DieselUserRepository::new(pool);
    /// # let _ = repository;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserRepositoryError {
    UserRepositoryError::connection(map_pool_error_message(error))
}

fn map_diesel_error(error: diesel::result::Error, operation: &str) -> UserRepositoryError {
    match classify(error, operation) {
        DieselFailure::UniqueViolation { constraint } => match constraint.as_deref() {
            Some(EMAIL_CONSTRAINT) => UserRepositoryError::duplicate_email(),
            Some(USERNAME_CONSTRAINT) => UserRepositoryError::duplicate_username(),
            other => {
                warn!(constraint = ?other, "unrecognised unique violation on users");
                UserRepositoryError::query("unique constraint violation")
            }
        },
        DieselFailure::NotFound => UserRepositoryError::not_found(),
        DieselFailure::Connection => UserRepositoryError::connection("database connection error"),
        DieselFailure::Query(message) => UserRepositoryError::query(message),
        DieselFailure::ForeignKeyViolation { .. } | DieselFailure::CheckViolation { .. } => {
            UserRepositoryError::query("constraint violation")
        }
    }
}

enum CreateOutcome {
    Created(UserRow, RoleRow),
    UnknownRole,
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn create_and_invite(
        &self,
        user: &NewUser,
        invitation: &Invitation,
    ) -> Result<User, UserRepositoryError> {
        let role_name = user.role.as_str();
        let invitation_row = NewInvitationRow {
            token_hash: invitation.token_hash.as_str(),
            user_id: *user.id.as_uuid(),
            expiry: invitation.expires_at,
        };

        let outcome = with_timeout(
            self.pool.query_timeout(),
            async {
                let mut conn = self.pool.get().await.map_err(map_pool_error)?;
                conn.transaction(|conn| {
                    async move {
                        let Some(role) = roles::table
                            .filter(roles::name.eq(role_name))
                            .select(RoleRow::as_select())
                            .first(conn)
                            .await
                            .optional()?
                        else {
                            return Ok(CreateOutcome::UnknownRole);
                        };

                        let created = diesel::insert_into(users::table)
                            .values(&NewUserRow {
                                id: *user.id.as_uuid(),
                                username: user.username.as_str(),
                                email: user.email.as_str(),
                                password_hash: user.password.as_str(),
                                role_id: role.id,
                            })
                            .returning(UserRow::as_returning())
                            .get_result(conn)
                            .await?;

                        diesel::insert_into(user_invitations::table)
                            .values(&invitation_row)
                            .execute(conn)
                            .await?;

                        Ok(CreateOutcome::Created(created, role))
                    }
                    .scope_boxed()
                })
                .await
                .map_err(|err| map_diesel_error(err, "create user and invitation"))
            },
            UserRepositoryError::timeout,
        )
        .await?;

        match outcome {
            CreateOutcome::Created(row, role) => {
                row.into_user(role).map_err(UserRepositoryError::query)
            }
            CreateOutcome::UnknownRole => Err(UserRepositoryError::unknown_role(role_name)),
        }
    }

    async fn activate(
        &self,
        token_hash: &TokenHash,
        now: DateTime<Utc>,
    ) -> Result<UserId, UserRepositoryError> {
        let hash = token_hash.as_str();
        let activated = with_timeout(
            self.pool.query_timeout(),
            async {
                let mut conn = self.pool.get().await.map_err(map_pool_error)?;
                conn.transaction(|conn| {
                    async move {
                        let Some(user_id) = user_invitations::table
                            .filter(user_invitations::token_hash.eq(hash))
                            .filter(user_invitations::expiry.gt(now))
                            .select(user_invitations::user_id)
                            .for_update()
                            .first::<uuid::Uuid>(conn)
                            .await
                            .optional()?
                        else {
                            return Ok(None);
                        };

                        diesel::update(users::table.filter(users::id.eq(user_id)))
                            .set(users::is_active.eq(true))
                            .execute(conn)
                            .await?;
                        diesel::delete(
                            user_invitations::table.filter(user_invitations::user_id.eq(user_id)),
                        )
                        .execute(conn)
                        .await?;

                        Ok(Some(user_id))
                    }
                    .scope_boxed()
                })
                .await
                .map_err(|err| map_diesel_error(err, "activate user"))
            },
            UserRepositoryError::timeout,
        )
        .await?;

        activated
            .map(UserId::from_uuid)
            .ok_or_else(UserRepositoryError::not_found)
    }

    async fn delete(&self, id: &UserId) -> Result<(), UserRepositoryError> {
        let user_id = *id.as_uuid();
        let deleted = with_timeout(
            self.pool.query_timeout(),
            async {
                let mut conn = self.pool.get().await.map_err(map_pool_error)?;
                conn.transaction(|conn| {
                    async move {
                        diesel::delete(
                            user_invitations::table.filter(user_invitations::user_id.eq(user_id)),
                        )
                        .execute(conn)
                        .await?;
                        diesel::delete(users::table.filter(users::id.eq(user_id)))
                            .execute(conn)
                            .await
                    }
                    .scope_boxed()
                })
                .await
                .map_err(|err| map_diesel_error(err, "delete user"))
            },
            UserRepositoryError::timeout,
        )
        .await?;

        if deleted == 0 {
            return Err(UserRepositoryError::not_found());
        }
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        let user_id = *id.as_uuid();
        let row = with_timeout(
            self.pool.query_timeout(),
            async {
                let mut conn = self.pool.get().await.map_err(map_pool_error)?;
                users::table
                    .inner_join(roles::table)
                    .filter(users::id.eq(user_id))
                    .select((UserRow::as_select(), RoleRow::as_select()))
                    .first::<(UserRow, RoleRow)>(&mut conn)
                    .await
                    .optional()
                    .map_err(|err| map_diesel_error(err, "find user by id"))
            },
            UserRepositoryError::timeout,
        )
        .await?;

        row.map(|(user, role)| user.into_user(role))
            .transpose()
            .map_err(UserRepositoryError::query)
    }

    async fn find_credentials_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<StoredCredentials>, UserRepositoryError> {
        let row = with_timeout(
            self.pool.query_timeout(),
            async {
                let mut conn = self.pool.get().await.map_err(map_pool_error)?;
                users::table
                    .inner_join(roles::table)
                    .filter(users::email.eq(email.as_str()))
                    .filter(users::is_active.eq(true))
                    .select((UserRow::as_select(), RoleRow::as_select()))
                    .first::<(UserRow, RoleRow)>(&mut conn)
                    .await
                    .optional()
                    .map_err(|err| map_diesel_error(err, "find credentials"))
            },
            UserRepositoryError::timeout,
        )
        .await?;

        let Some((user, role)) = row else {
            return Ok(None);
        };
        let password = PasswordDigest::new(user.password_hash.clone());
        let user = user.into_user(role).map_err(UserRepositoryError::query)?;
        Ok(Some(StoredCredentials { user, password }))
    }
}
