//! PostgreSQL access for the adapter suites.
//!
//! The suites run only when `SOCIAL_TEST_DATABASE_URL` names a database the
//! tests may migrate and write to. Rows are keyed by fresh identifiers so
//! suites never need to clean up after each other.

use std::sync::OnceLock;

use uuid::Uuid;

use social::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};

pub const DATABASE_URL_VAR: &str = "SOCIAL_TEST_DATABASE_URL";

static MIGRATED: OnceLock<()> = OnceLock::new();

fn database_url() -> Option<String> {
    match std::env::var(DATABASE_URL_VAR) {
        Ok(url) if !url.trim().is_empty() => Some(url),
        _ => {
            eprintln!("SKIP-TEST-DATABASE: {DATABASE_URL_VAR} is not set");
            None
        }
    }
}

/// A migrated pool, or `None` when no test database is configured.
pub async fn test_pool() -> Option<DbPool> {
    let url = database_url()?;
    MIGRATED.get_or_init(|| {
        run_pending_migrations(&url).expect("migrations apply to the test database");
    });
    let config = PoolConfig::new(url)
        .with_max_size(4)
        .with_min_idle(Some(1));
    Some(DbPool::new(config).await.expect("pool builds"))
}

/// A username unlikely to collide with rows left by earlier runs.
pub fn unique_name(prefix: &str) -> String {
    format!("{prefix}_{}", Uuid::new_v4().simple())
}
