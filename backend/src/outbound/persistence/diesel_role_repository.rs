//! PostgreSQL-backed `RoleRepository`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{RoleRepository, RoleRepositoryError};
use crate::domain::{Role, RoleName};

use super::diesel_helpers::{DieselFailure, classify, map_pool_error_message};
use super::models::RoleRow;
use super::pool::{DbPool, with_timeout};
use super::schema::roles;

#[derive(Clone)]
pub struct DieselRoleRepository {
    pool: DbPool,
}

impl DieselRoleRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_diesel_error(error: diesel::result::Error, operation: &str) -> RoleRepositoryError {
    match classify(error, operation) {
        DieselFailure::Connection => RoleRepositoryError::connection("database connection error"),
        DieselFailure::Query(message) => RoleRepositoryError::query(message),
        _ => RoleRepositoryError::query("database error"),
    }
}

#[async_trait]
impl RoleRepository for DieselRoleRepository {
    async fn find_by_name(&self, name: &RoleName) -> Result<Option<Role>, RoleRepositoryError> {
        with_timeout(
            self.pool.query_timeout(),
            async {
                let mut conn = self.pool.get().await.map_err(|err| {
                    RoleRepositoryError::connection(map_pool_error_message(err))
                })?;
                let row = roles::table
                    .filter(roles::name.eq(name.as_str()))
                    .select(RoleRow::as_select())
                    .first(&mut conn)
                    .await
                    .optional()
                    .map_err(|err| map_diesel_error(err, "find role"))?;
                row.map(Role::try_from)
                    .transpose()
                    .map_err(RoleRepositoryError::query)
            },
            RoleRepositoryError::timeout,
        )
        .await
    }
}
