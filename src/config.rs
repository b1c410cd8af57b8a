//! Settings for the mailbox connection and the key capture backend.
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! command-line flags (applied by the binary).
//!
//! ```toml
//! [database]
//! backend = "postgres"
//! host = "db.local"
//! port = 5432
//! name = "tetris"
//! user = "player"
//! password = "secret"
//! table = "Input"
//!
//! [capture]
//! mode = "auto"
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Deserialize;
use tracing::debug;

use crate::capture::CaptureMode;
use crate::error::ConfigError;

/// Mailbox storage backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// PostgreSQL server
    #[default]
    Postgres,
    /// Existing SQLite database file
    Sqlite,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseSettings {
    pub backend: Backend,
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    pub password: String,
    /// SQLite database file, only used by the sqlite backend.
    pub path: Option<PathBuf>,
    /// Mailbox table holding the single command row.
    pub table: String,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            backend: Backend::Postgres,
            host: "localhost".to_string(),
            port: 5432,
            name: "postgres".to_string(),
            user: "postgres".to_string(),
            password: "postgres".to_string(),
            path: None,
            table: "Input".to_string(),
        }
    }
}

impl DatabaseSettings {
    /// Human-readable connection target, without credentials.
    pub fn target(&self) -> String {
        match self.backend {
            Backend::Postgres => format!("{}:{}/{}", self.host, self.port, self.name),
            Backend::Sqlite => match &self.path {
                Some(path) => path.display().to_string(),
                None => "<no sqlite path>".to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CaptureSettings {
    pub mode: CaptureMode,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub capture: CaptureSettings,
}

impl Settings {
    /// Default config file location (`<config home>/input-bridge/config.toml`)
    pub fn default_path() -> Option<PathBuf> {
        dir_spec::config_home().map(|dir| dir.join("input-bridge").join("config.toml"))
    }

    pub fn from_toml(text: &str) -> std::result::Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load settings from `path`, or from the default location when `path`
    /// is `None`. An explicit path must exist; a missing default file just
    /// means defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => match Self::default_path() {
                Some(path) => (path, false),
                None => return Ok(Self::default()),
            },
        };

        if !required && !path.exists() {
            debug!("No config file at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let settings = Self::from_toml(&text)
            .with_context(|| format!("Failed to parse config file {:?}", path))?;
        debug!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        validate_table_name(&self.database.table)?;
        if self.database.backend == Backend::Sqlite && self.database.path.is_none() {
            return Err(ConfigError::MissingSqlitePath);
        }
        Ok(())
    }
}

/// The table name is spliced into SQL, so only plain identifiers are allowed.
pub fn validate_table_name(name: &str) -> std::result::Result<(), ConfigError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidTable(name.to_string()))
    }
}
