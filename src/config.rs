use std::{env, fmt::Display, str::FromStr, time::Duration};

use log::{info, warn};

use crate::constants::DEFAULT_BIND_ADDR;
use crate::error::DashboardError;

const TLS_MODES: [&str; 3] = ["require", "verify-ca", "verify-full"];

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    pub sslmode: String,
    pub pool_size: u32,
    pub connect_timeout: Duration,
}

impl DatabaseConfig {
    /// libpq keyword/value connection string.
    pub fn connection_string(&self) -> String {
        format!(
            "host={} port={} user={} password={} dbname={} sslmode={} connect_timeout={}",
            quote(&self.host),
            self.port,
            quote(&self.user),
            quote(&self.password),
            quote(&self.name),
            quote(&self.sslmode),
            self.connect_timeout.as_secs(),
        )
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub database: DatabaseConfig,
    /// Zero disables memoization of query results.
    pub cache_ttl: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, DashboardError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, DashboardError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let sslmode = load_or(&lookup, "DB_SSLMODE", "require");
        if !TLS_MODES.contains(&sslmode.as_str()) {
            return Err(DashboardError::Config(format!(
                "DB_SSLMODE must be one of {TLS_MODES:?}, got `{sslmode}`"
            )));
        }

        let pool_size: u32 = parse_or(&lookup, "DB_POOL_SIZE", 4)?;
        if pool_size == 0 {
            return Err(DashboardError::Config("DB_POOL_SIZE must be positive".into()));
        }

        let database = DatabaseConfig {
            host: load_or(&lookup, "DB_HOST", "localhost"),
            port: parse_or(&lookup, "DB_PORT", 5432)?,
            user: load_or(&lookup, "DB_USER", "postgres"),
            password: lookup("DB_PASSWORD").unwrap_or_default(),
            name: load_or(&lookup, "DB_NAME", "postgres"),
            sslmode,
            pool_size,
            connect_timeout: Duration::from_secs(parse_or(&lookup, "DB_CONNECT_TIMEOUT_SECS", 10)?),
        };

        if database.password.is_empty() {
            warn!("DB_PASSWORD is empty");
        }

        Ok(Self {
            bind_addr: load_or(&lookup, "BIND_ADDR", DEFAULT_BIND_ADDR),
            database,
            cache_ttl: Duration::from_secs(parse_or(&lookup, "CACHE_TTL_SECS", 600)?),
        })
    }
}

fn load_or<F>(lookup: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).filter(|v| !v.trim().is_empty()).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    })
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, DashboardError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Display,
    T::Err: Display,
{
    match lookup(key).filter(|v| !v.trim().is_empty()) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| DashboardError::Config(format!("invalid {key} value `{raw}`: {e}"))),
        None => {
            info!("{key} not set, using default: {default}");
            Ok(default)
        }
    }
}

fn quote(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('\'', "\\'");
    format!("'{escaped}'")
}
