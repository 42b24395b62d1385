//! Application settings loaded via OrthoConfig and the derived runtime
//! configuration handed to the server.

use std::net::SocketAddr;
use std::time::Duration;

use chrono::TimeDelta;
use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use social::outbound::persistence::PoolConfig;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_MIN_IDLE: u32 = 2;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_QUERY_TIMEOUT_SECS: u64 = 5;
const DEFAULT_JWT_ISSUER: &str = "social";
const DEFAULT_JWT_TTL_HOURS: i64 = 72;
const DEFAULT_INVITATION_TTL_HOURS: i64 = 72;
const DEFAULT_FRONTEND_URL: &str = "http://localhost:5173";
const DEFAULT_ROLE_CACHE: bool = true;

/// Settings layered from CLI flags, `SOCIAL_*` environment variables and
/// configuration files.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "SOCIAL")]
pub struct AppSettings {
    /// Socket address the HTTP listener binds to.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection string.
    pub database_url: Option<String>,
    pub db_max_connections: Option<u32>,
    pub db_min_idle: Option<u32>,
    pub db_connect_timeout_secs: Option<u64>,
    /// Ceiling applied to every database round trip.
    pub query_timeout_secs: Option<u64>,
    /// HMAC secret used to sign bearer tokens.
    pub jwt_secret: Option<String>,
    pub jwt_issuer: Option<String>,
    pub jwt_ttl_hours: Option<i64>,
    /// How long activation links stay redeemable.
    pub invitation_ttl_hours: Option<i64>,
    /// Base URL of the web client that serves activation links.
    pub frontend_url: Option<String>,
    /// Memoise role lookups in process. Enabled unless set to `false`.
    pub role_cache: Option<bool>,
}

/// Reasons settings cannot be turned into a runnable configuration.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("invalid bind address {value}: {source}")]
    BindAddr {
        value: String,
        source: std::net::AddrParseError,
    },
    #[error("invalid frontend url {value}: {source}")]
    FrontendUrl {
        value: String,
        source: url::ParseError,
    },
    #[error("{0} must be positive")]
    NonPositive(&'static str),
}

/// Validated configuration derived from [`AppSettings`].
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub bind_addr: SocketAddr,
    pub pool: PoolConfig,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub jwt_ttl: TimeDelta,
    pub invitation_ttl: TimeDelta,
    pub frontend_url: Url,
    pub role_cache: bool,
}

fn positive_hours(hours: i64, name: &'static str) -> Result<TimeDelta, SettingsError> {
    if hours <= 0 {
        return Err(SettingsError::NonPositive(name));
    }
    TimeDelta::try_hours(hours).ok_or(SettingsError::NonPositive(name))
}

impl AppSettings {
    pub fn bind_addr(&self) -> &str {
        self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR)
    }

    pub fn jwt_issuer(&self) -> &str {
        self.jwt_issuer.as_deref().unwrap_or(DEFAULT_JWT_ISSUER)
    }

    pub fn frontend_url(&self) -> &str {
        self.frontend_url.as_deref().unwrap_or(DEFAULT_FRONTEND_URL)
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(
            self.query_timeout_secs
                .unwrap_or(DEFAULT_QUERY_TIMEOUT_SECS),
        )
    }

    pub fn role_cache(&self) -> bool {
        self.role_cache.unwrap_or(DEFAULT_ROLE_CACHE)
    }

    /// Validate the settings and apply defaults.
    pub fn into_runtime(self) -> Result<RuntimeConfig, SettingsError> {
        let bind_addr =
            self.bind_addr()
                .parse()
                .map_err(|source| SettingsError::BindAddr {
                    value: self.bind_addr().to_owned(),
                    source,
                })?;
        let frontend_url =
            Url::parse(self.frontend_url()).map_err(|source| SettingsError::FrontendUrl {
                value: self.frontend_url().to_owned(),
                source,
            })?;
        if self.query_timeout().is_zero() {
            return Err(SettingsError::NonPositive("query_timeout_secs"));
        }
        let jwt_ttl = positive_hours(
            self.jwt_ttl_hours.unwrap_or(DEFAULT_JWT_TTL_HOURS),
            "jwt_ttl_hours",
        )?;
        let invitation_ttl = positive_hours(
            self.invitation_ttl_hours
                .unwrap_or(DEFAULT_INVITATION_TTL_HOURS),
            "invitation_ttl_hours",
        )?;
        let jwt_issuer = self.jwt_issuer().to_owned();
        let query_timeout = self.query_timeout();
        let role_cache = self.role_cache();

        let database_url = self
            .database_url
            .filter(|url| !url.trim().is_empty())
            .ok_or(SettingsError::Missing("database_url"))?;
        let jwt_secret = self
            .jwt_secret
            .filter(|secret| !secret.is_empty())
            .ok_or(SettingsError::Missing("jwt_secret"))?;

        let pool = PoolConfig::new(database_url)
            .with_max_size(self.db_max_connections.unwrap_or(DEFAULT_MAX_CONNECTIONS))
            .with_min_idle(Some(self.db_min_idle.unwrap_or(DEFAULT_MIN_IDLE)))
            .with_connection_timeout(Duration::from_secs(
                self.db_connect_timeout_secs
                    .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS),
            ))
            .with_query_timeout(query_timeout);

        Ok(RuntimeConfig {
            bind_addr,
            pool,
            jwt_secret,
            jwt_issuer,
            jwt_ttl,
            invitation_ttl,
            frontend_url,
            role_cache,
        })
    }
}
