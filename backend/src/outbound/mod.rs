//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL repositories built on Diesel
//! - **cache**: in-process role cache decorating a role repository
//! - **security**: Argon2 password digests and JWT bearer tokens
//! - **notify**: notification delivery
//!
//! Adapters translate between domain types and infrastructure
//! representations. They contain no business logic.

pub mod cache;
pub mod notify;
pub mod persistence;
pub mod security;
