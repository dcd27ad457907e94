//! Configuration loading from the process environment
//!
//! Values come from environment variables, optionally seeded from a `.env`
//! file. Every setting is read once at startup and validated up front so a
//! misconfigured process fails before it binds a port or opens a pool.
//!
//! Database settings accept two spellings each; the `DB_*` name wins when
//! both are present:
//!
//! | field    | primary       | alternate           |
//! |----------|---------------|---------------------|
//! | host     | `DB_HOST`     | `POSTGRES_HOST`     |
//! | port     | `DB_PORT`     | `POSTGRES_PORT`     |
//! | user     | `DB_USER`     | `POSTGRES_USER`     |
//! | password | `DB_PASSWORD` | `POSTGRES_PASSWORD` |
//! | database | `DB_NAME`     | `POSTGRES_DB`       |

use crate::{Error, Result};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Listen port used when `PORT` is not set
pub const DEFAULT_PORT: u16 = 8080;

/// Metadata endpoint used when `ENRICHMENT_API_URL` is not set
pub const DEFAULT_ENRICHMENT_URL: &str = "http://localhost:8081/info";

/// Outbound enrichment timeout used when `ENRICHMENT_TIMEOUT_SECS` is not set
pub const DEFAULT_ENRICHMENT_TIMEOUT_SECS: u64 = 10;

/// Load a `.env` file into the process environment
///
/// Variables already present in the environment are not overwritten.
/// Returns `Ok(false)` when the file does not exist; a file that exists but
/// cannot be parsed is a configuration error. Runs before tracing is set up
/// (the file may carry `RUST_LOG`), so the caller logs the outcome.
pub fn load_env_file(path: &Path) -> Result<bool> {
    match dotenvy::from_path(path) {
        Ok(()) => Ok(true),
        Err(e) if e.not_found() => Ok(false),
        Err(e) => Err(Error::Config(format!(
            "Failed to load env file {}: {}",
            path.display(),
            e
        ))),
    }
}

/// PostgreSQL SSL negotiation mode (`DB_SSLMODE`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SslMode {
    #[default]
    Disable,
    Prefer,
    Require,
}

impl FromStr for SslMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "disable" => Ok(SslMode::Disable),
            "prefer" => Ok(SslMode::Prefer),
            "require" => Ok(SslMode::Require),
            other => Err(Error::Config(format!(
                "DB_SSLMODE must be one of disable, prefer, require (got '{}')",
                other
            ))),
        }
    }
}

impl fmt::Display for SslMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SslMode::Disable => "disable",
            SslMode::Prefer => "prefer",
            SslMode::Require => "require",
        };
        f.write_str(s)
    }
}

/// Database connection settings
#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    pub ssl_mode: SslMode,
}

// Hand-written so the password never reaches a log line.
impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"***")
            .field("name", &self.name)
            .field("ssl_mode", &self.ssl_mode)
            .finish()
    }
}

impl DatabaseConfig {
    /// Read database settings from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read database settings through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = required(&lookup, "DB_HOST", "POSTGRES_HOST")?;
        let (port_var, port_raw) = required_var(&lookup, "DB_PORT", "POSTGRES_PORT")?;
        let port = parse_port(port_var, &port_raw)?;
        let user = required(&lookup, "DB_USER", "POSTGRES_USER")?;
        let password = required(&lookup, "DB_PASSWORD", "POSTGRES_PASSWORD")?;
        let name = required(&lookup, "DB_NAME", "POSTGRES_DB")?;
        let ssl_mode = match non_empty(&lookup, "DB_SSLMODE") {
            Some(raw) => raw.parse()?,
            None => SslMode::default(),
        };

        Ok(Self {
            host: host.trim().to_string(),
            port,
            user: user.trim().to_string(),
            password,
            name: name.trim().to_string(),
            ssl_mode,
        })
    }
}

/// Settings for the outbound song-metadata lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichmentConfig {
    pub api_url: String,
    pub timeout: Duration,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_ENRICHMENT_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_ENRICHMENT_TIMEOUT_SECS),
        }
    }
}

impl EnrichmentConfig {
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = match non_empty(&lookup, "ENRICHMENT_API_URL") {
            Some(url) => {
                let url = url.trim().to_string();
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    return Err(Error::Config(format!(
                        "ENRICHMENT_API_URL must be an absolute http(s) URL (got '{}')",
                        url
                    )));
                }
                url
            }
            None => DEFAULT_ENRICHMENT_URL.to_string(),
        };

        let timeout_secs = match non_empty(&lookup, "ENRICHMENT_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(Error::Config(format!(
                        "ENRICHMENT_TIMEOUT_SECS must be a positive integer (got '{}')",
                        raw
                    )))
                }
            },
            None => DEFAULT_ENRICHMENT_TIMEOUT_SECS,
        };

        Ok(Self {
            api_url,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

/// Complete service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// HTTP listen port (`PORT`)
    pub port: u16,
    pub database: DatabaseConfig,
    pub enrichment: EnrichmentConfig,
}

impl ServiceConfig {
    /// Read the full service configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match non_empty(&lookup, "PORT") {
            Some(raw) => parse_port("PORT", &raw)?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            port,
            database: DatabaseConfig::from_lookup(&lookup)?,
            enrichment: EnrichmentConfig::from_lookup(&lookup)?,
        })
    }
}

fn non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).filter(|v| !v.trim().is_empty())
}

fn required<F>(lookup: &F, primary: &str, alternate: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    required_var(lookup, primary, alternate).map(|(_, value)| value)
}

/// Like [`required`], also returning the name of the variable that was read
fn required_var<'k, F>(
    lookup: &F,
    primary: &'k str,
    alternate: &'k str,
) -> Result<(&'k str, String)>
where
    F: Fn(&str) -> Option<String>,
{
    non_empty(lookup, primary)
        .map(|v| (primary, v))
        .or_else(|| non_empty(lookup, alternate).map(|v| (alternate, v)))
        .ok_or_else(|| Error::Config(format!("{} (or {}) must be set", primary, alternate)))
}

fn parse_port(name: &str, raw: &str) -> Result<u16> {
    match raw.trim().parse::<u16>() {
        Ok(port) if port > 0 => Ok(port),
        _ => Err(Error::Config(format!(
            "{} must be a positive integer between 1 and 65535 (got '{}')",
            name, raw
        ))),
    }
}
