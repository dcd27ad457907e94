//! Database initialization
//!
//! Opens the PostgreSQL pool with a bounded reconnect loop, verifies it with a
//! ping, and creates the `songs` table if it does not exist yet.

use crate::config::{DatabaseConfig, SslMode};
use crate::{Error, Result};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::{Connection, PgPool};
use std::time::Duration;
use tracing::{info, warn};

/// Upper bound on open connections
pub const MAX_CONNECTIONS: u32 = 20;

/// Connections older than this are closed and replaced
pub const MAX_CONNECTION_LIFETIME: Duration = Duration::from_secs(5 * 60);

/// Idle connections are reaped after this long
pub const IDLE_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// How long a checkout (including the initial connect) may wait
pub const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);

/// Pool sizing and lifetime limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSettings {
    pub max_connections: u32,
    pub min_connections: u32,
    pub max_lifetime: Duration,
    pub idle_timeout: Duration,
    pub acquire_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: MAX_CONNECTIONS,
            min_connections: 0,
            max_lifetime: MAX_CONNECTION_LIFETIME,
            idle_timeout: IDLE_TIMEOUT,
            acquire_timeout: ACQUIRE_TIMEOUT,
        }
    }
}

impl PoolSettings {
    pub fn pool_options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .max_lifetime(self.max_lifetime)
            .idle_timeout(self.idle_timeout)
            .acquire_timeout(self.acquire_timeout)
    }
}

/// Fixed-delay reconnect policy for startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            delay: Duration::from_secs(5),
        }
    }
}

/// Build typed connection options from configuration
pub fn connect_options(cfg: &DatabaseConfig) -> PgConnectOptions {
    let ssl_mode = match cfg.ssl_mode {
        SslMode::Disable => PgSslMode::Disable,
        SslMode::Prefer => PgSslMode::Prefer,
        SslMode::Require => PgSslMode::Require,
    };

    PgConnectOptions::new()
        .host(&cfg.host)
        .port(cfg.port)
        .username(&cfg.user)
        .password(&cfg.password)
        .database(&cfg.name)
        .ssl_mode(ssl_mode)
}

/// Connection string with the password masked, for log output
pub fn redacted_url(cfg: &DatabaseConfig) -> String {
    format!(
        "postgres://{}:***@{}:{}/{}?sslmode={}",
        cfg.user, cfg.host, cfg.port, cfg.name, cfg.ssl_mode
    )
}

/// Open the pool, retrying per `retry`
///
/// Each attempt opens the pool and pings one connection. When every attempt
/// fails the last driver error is returned inside [`Error::Connection`].
pub async fn connect_with_retry(
    cfg: &DatabaseConfig,
    settings: &PoolSettings,
    retry: &RetryPolicy,
) -> Result<PgPool> {
    let options = connect_options(cfg);
    let attempts = retry.max_attempts.max(1);
    let mut last_error = None;

    for attempt in 1..=attempts {
        match try_connect(&options, settings).await {
            Ok(pool) => {
                info!(attempt, "Connected to database {}", redacted_url(cfg));
                return Ok(pool);
            }
            Err(e) => {
                warn!(attempt, max_attempts = attempts, error = %e, "Database connection attempt failed");
                last_error = Some(e);
                if attempt < attempts {
                    tokio::time::sleep(retry.delay).await;
                }
            }
        }
    }

    Err(Error::Connection {
        attempts,
        source: last_error.unwrap_or(sqlx::Error::PoolTimedOut),
    })
}

async fn try_connect(
    options: &PgConnectOptions,
    settings: &PoolSettings,
) -> std::result::Result<PgPool, sqlx::Error> {
    let pool = settings.pool_options().connect_with(options.clone()).await?;
    if let Err(e) = ping(&pool).await {
        pool.close().await;
        return Err(e);
    }
    Ok(pool)
}

/// Check out one connection and round-trip a ping
pub async fn ping(pool: &PgPool) -> std::result::Result<(), sqlx::Error> {
    let mut conn = pool.acquire().await?;
    conn.ping().await
}

/// Create the `songs` table and its lookup index (idempotent)
pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS songs (
            id BIGSERIAL PRIMARY KEY,
            group_name TEXT NOT NULL CHECK (length(btrim(group_name)) > 0),
            title TEXT NOT NULL CHECK (length(btrim(title)) > 0),
            release_date TIMESTAMPTZ,
            text TEXT NOT NULL DEFAULT '',
            link TEXT NOT NULL DEFAULT '',
            created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_songs_group_title ON songs (group_name, title)")
        .execute(pool)
        .await?;

    info!("Database schema ready (songs)");
    Ok(())
}

/// Connect with the default limits and retry policy, then ensure the schema
pub async fn init_database(cfg: &DatabaseConfig) -> Result<PgPool> {
    let pool = connect_with_retry(cfg, &PoolSettings::default(), &RetryPolicy::default()).await?;
    ensure_schema(&pool).await?;
    Ok(pool)
}
