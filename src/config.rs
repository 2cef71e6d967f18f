//! Startup configuration
//!
//! Values come from process environment variables, falling back to a
//! dotenv-style credentials file (`.cred` by default). Configuration is read
//! once at startup and handed to the store and the HTTP server; nothing here
//! is global.

use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use sqlx::mysql::{MySqlConnectOptions, MySqlSslMode};
use thiserror::Error;

use crate::observability::Severity;

/// Default credentials file, relative to the working directory
pub const DEFAULT_CRED_FILE: &str = ".cred";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A variable that has no default is unset
    #[error("Missing required setting: {0}")]
    Missing(&'static str),

    /// A variable is set but cannot be parsed
    #[error("Invalid value '{value}' for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },

    /// The credentials file exists but cannot be parsed
    #[error("Failed to read credentials file {path}: {reason}")]
    CredFile { path: PathBuf, reason: String },
}

/// Key/value lookup: process environment first, then the credentials file
#[derive(Debug, Clone, Default)]
pub struct EnvSource {
    file_values: HashMap<String, String>,
    use_process_env: bool,
}

impl EnvSource {
    /// Process environment only
    pub fn from_process() -> Self {
        Self {
            file_values: HashMap::new(),
            use_process_env: true,
        }
    }

    /// Process environment plus a credentials file.
    ///
    /// A missing file is not an error; a malformed one is.
    pub fn with_cred_file(path: &Path) -> Result<Self, ConfigError> {
        let mut source = Self::from_process();

        let iter = match dotenvy::from_path_iter(path) {
            Ok(iter) => iter,
            Err(e) if e.not_found() => return Ok(source),
            Err(e) => {
                return Err(ConfigError::CredFile {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                })
            }
        };

        for item in iter {
            let (key, value) = item.map_err(|e| ConfigError::CredFile {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
            source.file_values.insert(key, value);
        }

        Ok(source)
    }

    /// Fixed values, process environment ignored
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            file_values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            use_process_env: false,
        }
    }

    /// Look up a key
    pub fn get(&self, key: &str) -> Option<String> {
        if self.use_process_env {
            if let Ok(value) = env::var(key) {
                return Some(value);
            }
        }
        self.file_values.get(key).cloned()
    }

    /// Look up and parse a key, using `default` when unset or blank
    pub fn parse_or<T>(&self, key: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get(key) {
            Some(raw) if !raw.trim().is_empty() => {
                raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
                    key,
                    value: raw.clone(),
                    reason: e.to_string(),
                })
            }
            _ => Ok(default),
        }
    }

    /// Minimum log severity from `LOG_LEVEL` (default INFO)
    pub fn log_level(&self) -> Result<Severity, ConfigError> {
        self.parse_or("LOG_LEVEL", Severity::Info)
    }
}

/// MySQL connection settings
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// `DB_HOST` (default: "localhost")
    pub host: String,
    /// `DB_USER` (required to connect)
    pub user: Option<String>,
    /// `DB_PASSWORD` (default: empty)
    pub password: String,
    /// `DB_NAME` (default: "db_prep")
    pub database: String,
    /// `DB_PORT` (default: 3306)
    pub port: u16,
    /// `SSL_CA_PATH`; when set the server certificate is verified against it
    pub ssl_ca: Option<PathBuf>,
    /// `DB_MAX_CONNECTIONS` (default: 10)
    pub max_connections: u32,
    /// `DB_ACQUIRE_TIMEOUT_SECS` (default: 5)
    pub acquire_timeout: Duration,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            user: None,
            password: String::new(),
            database: "db_prep".to_string(),
            port: 3306,
            ssl_ca: None,
            max_connections: 10,
            acquire_timeout: Duration::from_secs(5),
        }
    }
}

impl DatabaseConfig {
    /// Build from an [`EnvSource`]
    pub fn from_source(source: &EnvSource) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let max_connections: u32 = source.parse_or("DB_MAX_CONNECTIONS", defaults.max_connections)?;
        if max_connections == 0 {
            return Err(ConfigError::Invalid {
                key: "DB_MAX_CONNECTIONS",
                value: "0".to_string(),
                reason: "must be > 0".to_string(),
            });
        }

        let acquire_secs: u64 =
            source.parse_or("DB_ACQUIRE_TIMEOUT_SECS", defaults.acquire_timeout.as_secs())?;

        Ok(Self {
            host: non_blank(source.get("DB_HOST")).unwrap_or(defaults.host),
            user: non_blank(source.get("DB_USER")),
            password: source.get("DB_PASSWORD").unwrap_or_default(),
            database: non_blank(source.get("DB_NAME")).unwrap_or(defaults.database),
            port: source.parse_or("DB_PORT", defaults.port)?,
            ssl_ca: non_blank(source.get("SSL_CA_PATH")).map(PathBuf::from),
            max_connections,
            acquire_timeout: Duration::from_secs(acquire_secs),
        })
    }

    /// sqlx connect options for these settings
    pub fn connect_options(&self) -> Result<MySqlConnectOptions, ConfigError> {
        let user = self.user.as_deref().ok_or(ConfigError::Missing("DB_USER"))?;

        let mut options = MySqlConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(user)
            .password(&self.password)
            .database(&self.database);

        if let Some(ca) = &self.ssl_ca {
            options = options.ssl_mode(MySqlSslMode::VerifyCa).ssl_ca(ca);
        }

        Ok(options)
    }

    /// `user@host:port/database`, for logs
    pub fn describe(&self) -> String {
        format!(
            "{}@{}:{}/{}",
            self.user.as_deref().unwrap_or("?"),
            self.host,
            self.port,
            self.database
        )
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
