//! Social network backend: users, roles, posts, comments, follows and
//! personalised feeds behind a REST API.
//!
//! The crate is laid out hexagonally. [`domain`] owns entities, ports and
//! use-case services; [`outbound`] implements driven ports on PostgreSQL,
//! Argon2 and JWT; [`inbound`] exposes the driving ports over HTTP.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
