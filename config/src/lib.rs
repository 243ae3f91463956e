//! # Configuration Management for DocHaus
//!
//! This crate provides the key/value configuration source the connection registry reads,
//! and the per-connection settings used to build a store connection URI.
//!
//! ## Quick Start
//!
//! ### TOML File Configuration
//! ```toml
//! [database.mongo.default]
//! host = "db1.internal,db2.internal"
//! port = 27017
//! database = "inventory"
//! username = "app"
//! password = "s3cret/with@chars"
//! charset = "utf8"
//!
//! [database.mongo.default.options]
//! replicaSet = "rs0"
//! authSource = "admin"
//! ```
//!
//! Load configuration:
//! ```rust,no_run
//! use config::{ConfigSource, ConnectionConfig, TomlSource};
//!
//! // Load from the file named by DOCHAUS_CONFIG, or ./dochaus.toml
//! let source = TomlSource::load()?;
//!
//! let default = ConnectionConfig::from_source(&source, "mongo", "default")?;
//! println!("{}", default.connection_string());
//! # Ok::<(), config::ConfigError>(())
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::{env, path::Path};
use thiserror::Error;

const DEFAULT_CONFIG_PATH: &str = "./dochaus.toml";
const CONFIG_PATH_VAR: &str = "DOCHAUS_CONFIG";
const DEFAULT_CHARSET: &str = "utf8";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Dotenvy error: {0}")]
    Dotenvy(#[from] dotenvy::Error),
    #[error("Missing configuration key: {0}")]
    Missing(String),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Read access to dotted configuration keys such as `database.mongo.default.host`
pub trait ConfigSource: Send + Sync {
    /// Scalar value at `key`, rendered as a string
    fn get_string(&self, key: &str) -> Option<String>;

    /// Scalar entries of the table at `key`, rendered as strings
    fn get_string_map(&self, key: &str) -> BTreeMap<String, String>;

    fn get_string_or(&self, key: &str, default: &str) -> String {
        self.get_string(key)
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| default.to_string())
    }
}

/// Configuration source backed by a parsed TOML document
#[derive(Debug, Clone, Default)]
pub struct TomlSource {
    root: toml::Table,
}

impl TomlSource {
    /// Load configuration from the TOML file specified in .env or defaults
    pub fn load() -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(_) => {}
            Err(e) if e.not_found() => {}
            Err(e) => return Err(e.into()),
        }

        if let Ok(config_path) = env::var(CONFIG_PATH_VAR) {
            Self::from_file(&config_path)
        } else if Path::new(DEFAULT_CONFIG_PATH).exists() {
            Self::from_file(DEFAULT_CONFIG_PATH)
        } else {
            Err(ConfigError::Invalid(format!(
                "Config path must be specified in .env file as {} or in {} file",
                CONFIG_PATH_VAR, DEFAULT_CONFIG_PATH
            )))
        }
    }

    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let root: toml::Table = toml::from_str(content)?;
        Ok(Self { root })
    }

    fn lookup(&self, key: &str) -> Option<&toml::Value> {
        let mut segments = key.split('.');
        let mut current = self.root.get(segments.next()?)?;
        for segment in segments {
            current = current.as_table()?.get(segment)?;
        }
        Some(current)
    }
}

/// Render a scalar TOML value the way it would be written in a URI
fn scalar_to_string(value: &toml::Value) -> Option<String> {
    match value {
        toml::Value::String(s) => Some(s.clone()),
        toml::Value::Integer(i) => Some(i.to_string()),
        toml::Value::Float(f) => Some(f.to_string()),
        toml::Value::Boolean(b) => Some(b.to_string()),
        toml::Value::Datetime(d) => Some(d.to_string()),
        toml::Value::Array(_) | toml::Value::Table(_) => None,
    }
}

impl ConfigSource for TomlSource {
    fn get_string(&self, key: &str) -> Option<String> {
        self.lookup(key).and_then(scalar_to_string)
    }

    fn get_string_map(&self, key: &str) -> BTreeMap<String, String> {
        self.lookup(key)
            .and_then(toml::Value::as_table)
            .map(|table| {
                table
                    .iter()
                    .filter_map(|(k, v)| scalar_to_string(v).map(|v| (k.clone(), v)))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Flat in-memory configuration source, handy for tests and programmatic setup
#[derive(Debug, Clone, Default)]
pub struct MapSource {
    values: BTreeMap<String, String>,
}

impl MapSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }
}

impl ConfigSource for MapSource {
    fn get_string(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn get_string_map(&self, key: &str) -> BTreeMap<String, String> {
        let prefix = format!("{}.", key);
        self.values
            .iter()
            .filter_map(|(k, v)| {
                k.strip_prefix(&prefix)
                    .filter(|rest| !rest.contains('.'))
                    .map(|rest| (rest.to_string(), v.clone()))
            })
            .collect()
    }
}

/// Settings of one logical store connection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: String,
    pub database: String,
    pub username: String,
    pub password: String,
    pub charset: String,
    pub options: BTreeMap<String, String>,
}

impl ConnectionConfig {
    /// Read `database.<store>.<connection>.*` from a configuration source
    pub fn from_source(
        source: &dyn ConfigSource,
        store: &str,
        connection: &str,
    ) -> Result<Self, ConfigError> {
        let key = |field: &str| format!("database.{}.{}.{}", store, connection, field);

        let config = Self {
            host: source.get_string(&key("host")).unwrap_or_default(),
            port: source.get_string(&key("port")).unwrap_or_default(),
            database: source.get_string(&key("database")).unwrap_or_default(),
            username: source.get_string(&key("username")).unwrap_or_default(),
            password: source.get_string(&key("password")).unwrap_or_default(),
            charset: source.get_string_or(&key("charset"), DEFAULT_CHARSET),
            options: source.get_string_map(&key("options")),
        };

        if config.host.is_empty() {
            return Err(ConfigError::Missing(key("host")));
        }
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<(), ConfigError> {
        if !self.port.is_empty() && self.port.parse::<u16>().is_err() {
            return Err(ConfigError::Invalid(format!(
                "Database port '{}' is not a valid port number",
                self.port
            )));
        }
        if self.host.split(',').any(|h| h.trim().is_empty()) {
            return Err(ConfigError::Invalid(format!(
                "Database host list '{}' contains an empty entry",
                self.host
            )));
        }
        Ok(())
    }

    /// Build connection string
    pub fn connection_string(&self) -> String {
        let hosts = self
            .host
            .split(',')
            .map(|host| {
                if self.port.is_empty() {
                    host.trim().to_string()
                } else {
                    format!("{}:{}", host.trim(), self.port)
                }
            })
            .collect::<Vec<_>>()
            .join(",");

        let options: String = self
            .options
            .iter()
            .map(|(key, value)| format!("&{}={}", key, value))
            .collect();

        if !self.username.is_empty() && !self.password.is_empty() {
            format!(
                "mongodb://{}:{}@{}/{}?charset={}{}",
                self.username,
                urlencoding::encode(&self.password),
                hosts,
                self.database,
                self.charset,
                options
            )
        } else {
            format!(
                "mongodb://{}/{}?charset={}{}",
                hosts, self.database, self.charset, options
            )
        }
    }
}
