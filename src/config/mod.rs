//! Configuration loading and management
//!
//! Configuration comes from the environment (a `.env` file is loaded first
//! when present) or from YAML. Every key has a default, so an empty
//! environment yields a working local setup.
//!
//! | variable               | default       |
//! |------------------------|---------------|
//! | `APP_PORT`             | `8080`        |
//! | `ENV`                  | `development` |
//! | `AUTH_TOKEN`           | unset (auth disabled) |
//! | `OPERATION_TIMEOUT_MS` | unset (no deadline) |
//! | `LOG_FORMAT`           | `pretty` (`json` also accepted) |
//! | `DATABASE_URL`         | unset, overrides the `DB_*` keys |
//! | `DB_HOST`              | `localhost`   |
//! | `DB_PORT`              | `5432`        |
//! | `DB_USER`              | `postgres`    |
//! | `DB_PASSWORD`          | empty         |
//! | `DB_NAME`              | `paymentdb`   |
//! | `DB_SSLMODE`           | `disable`     |
//! | `DB_MAX_CONNECTIONS`   | `10`          |

use crate::core::error::ConfigError;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("expected 'pretty' or 'json', got '{}'", other)),
        }
    }
}

/// PostgreSQL connection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Full connection URL; takes precedence over the individual fields
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    pub sslmode: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            host: "localhost".to_string(),
            port: 5432,
            user: "postgres".to_string(),
            password: String::new(),
            name: "paymentdb".to_string(),
            sslmode: "disable".to_string(),
            max_connections: 10,
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub port: u16,
    pub environment: String,
    /// Bearer token required on `/api` routes; `None` disables auth
    pub auth_token: Option<String>,
    pub operation_timeout_ms: Option<u64>,
    pub log_format: LogFormat,
    pub database: DatabaseConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            environment: "development".to_string(),
            auth_token: None,
            operation_timeout_ms: None,
            log_format: LogFormat::default(),
            database: DatabaseConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load from the process environment, reading `.env` first if present
    pub fn from_env() -> std::result::Result<Self, ConfigError> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                return Err(ConfigError::ParseError {
                    file: Some(".env".to_string()),
                    message: e.to_string(),
                });
            }
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup; empty values count as unset
    pub fn from_lookup<F>(lookup: F) -> std::result::Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();
        let db = defaults.database;

        Ok(Self {
            port: parse_or(&get, "APP_PORT", defaults.port)?,
            environment: get("ENV").unwrap_or(defaults.environment),
            auth_token: get("AUTH_TOKEN"),
            operation_timeout_ms: get("OPERATION_TIMEOUT_MS")
                .map(|raw| parse_value("OPERATION_TIMEOUT_MS", &raw))
                .transpose()?,
            log_format: parse_or(&get, "LOG_FORMAT", defaults.log_format)?,
            database: DatabaseConfig {
                url: get("DATABASE_URL"),
                host: get("DB_HOST").unwrap_or(db.host),
                port: parse_or(&get, "DB_PORT", db.port)?,
                user: get("DB_USER").unwrap_or(db.user),
                password: lookup("DB_PASSWORD").unwrap_or(db.password),
                name: get("DB_NAME").unwrap_or(db.name),
                sslmode: get("DB_SSLMODE").unwrap_or(db.sslmode),
                max_connections: parse_or(&get, "DB_MAX_CONNECTIONS", db.max_connections)?,
            },
        })
    }

    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_yaml_str(&content).map_err(|e| match e {
            ConfigError::ParseError { message, .. } => ConfigError::ParseError {
                file: Some(path.to_string()),
                message,
            },
            other => other,
        })?)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> std::result::Result<Self, ConfigError> {
        serde_yaml::from_str(yaml).map_err(|e| ConfigError::ParseError {
            file: None,
            message: e.to_string(),
        })
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }

    pub fn operation_timeout(&self) -> Option<Duration> {
        self.operation_timeout_ms.map(Duration::from_millis)
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }
}

fn parse_value<T>(key: &str, raw: &str) -> std::result::Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        field: key.to_string(),
        value: raw.to_string(),
        message: e.to_string(),
    })
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> std::result::Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => parse_value(key, &raw),
        None => Ok(default),
    }
}
