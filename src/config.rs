//! Runtime configuration loaded from the environment.
//!
//! Every setting has a default except the signing key and the contract
//! address. Those two are optional at startup and only fail the chain
//! operations that need them.

use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use sqlx::postgres::PgConnectOptions;

use crate::domain::ConfigError;
use crate::infra::{EvmClientConfig, PostgresConfig};

/// Output format for the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(ConfigError::InvalidValue {
                key: "LOG_FORMAT".to_string(),
                message: format!("expected 'pretty' or 'json', got '{}'", other),
            }),
        }
    }
}

/// PostgreSQL connection settings.
#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: SecretString,
    pub name: String,
}

impl DatabaseSettings {
    /// Build sqlx connect options without going through a URL string.
    #[must_use]
    pub fn connect_options(&self) -> PgConnectOptions {
        use secrecy::ExposeSecret;

        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(self.password.expose_secret())
            .database(&self.name)
    }
}

/// Complete application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub log_format: LogFormat,
    pub database: DatabaseSettings,
    pub pool: PostgresConfig,
    pub chain: EvmClientConfig,
}

impl AppConfig {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let get_or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let chain_defaults = EvmClientConfig::default();
        let pool_defaults = PostgresConfig::default();

        let timeout_secs: u64 = parse_or(get("CHAIN_TIMEOUT_SECS"), "CHAIN_TIMEOUT_SECS", 10)?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "CHAIN_TIMEOUT_SECS".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }

        let chain = EvmClientConfig {
            node_url: get_or("NODE_URL", &chain_defaults.node_url),
            private_key: get("PRIVATE_KEY").map(SecretString::from),
            contract_address: get("CONTRACT_ADDRESS"),
            gas_limit: parse_or(get("GAS_LIMIT"), "GAS_LIMIT", chain_defaults.gas_limit)?,
            timeout: Duration::from_secs(timeout_secs),
        };

        let database = DatabaseSettings {
            host: get_or("DB_HOST", "localhost"),
            port: parse_or(get("DB_PORT"), "DB_PORT", 5432)?,
            user: get_or("DB_USER", "postgres"),
            password: SecretString::from(get_or("DB_PASSWORD", "password")),
            name: get_or("DB_NAME", "besu_challenge"),
        };

        let pool = PostgresConfig {
            max_connections: parse_or(
                get("DB_MAX_CONNECTIONS"),
                "DB_MAX_CONNECTIONS",
                pool_defaults.max_connections,
            )?,
            ..pool_defaults
        };

        let log_format = match get("LOG_FORMAT") {
            Some(raw) => raw.parse()?,
            None => LogFormat::default(),
        };

        Ok(Self {
            port: parse_or(get("PORT"), "PORT", 8080)?,
            log_format,
            database,
            pool,
            chain,
        })
    }
}

fn parse_or<T>(raw: Option<String>, key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        }),
        None => Ok(default),
    }
}
