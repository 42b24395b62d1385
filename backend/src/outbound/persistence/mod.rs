//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! This module provides concrete implementations of the domain's driven
//! storage ports backed by PostgreSQL via Diesel with async support through
//! `diesel-async` and `bb8` connection pooling.
//!
//! # Architecture
//!
//! - **Thin adapters**: repository implementations only translate between
//!   Diesel rows and domain types. No business logic resides here.
//! - **Internal models**: row structs (`models.rs`) and table definitions
//!   (`schema.rs`) never leave this module.
//! - **Bounded work**: every operation, including connection checkout, runs
//!   under the pool's per-query timeout.
//! - **Atomic lifecycle steps**: multi-row identity changes run in a single
//!   transaction.
//!
//! # Example
//!
//! ```ignore
//! use social::outbound::persistence::{DbPool, PoolConfig, DieselPostRepository};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/social")).await?;
//! let posts = DieselPostRepository::new(pool);
//! ```

mod diesel_comment_repository;
mod diesel_feed_repository;
mod diesel_follower_repository;
pub(crate) mod diesel_helpers;
mod diesel_post_repository;
mod diesel_role_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_comment_repository::DieselCommentRepository;
pub use diesel_feed_repository::DieselFeedRepository;
pub use diesel_follower_repository::DieselFollowerRepository;
pub use diesel_post_repository::DieselPostRepository;
pub use diesel_role_repository::DieselRoleRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError, with_timeout};
