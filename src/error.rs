//! Error handling for Input Bridge
//!
//! Defines the domain error types for key capture, mailbox writes and
//! configuration, and establishes a unified Result type using anyhow for
//! context chaining at the application edge.

use thiserror::Error;

/// Failures while reading a keypress. All of them are fatal.
#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("input device error: {0}")]
    Io(#[from] std::io::Error),

    #[error("input closed")]
    Closed,

    #[error("{0} key capture is not available on this platform")]
    Unsupported(&'static str),
}

/// Failures while writing the mailbox row.
#[derive(Error, Debug)]
pub enum MailboxError {
    #[error("table '{0}' does not exist")]
    MissingTable(String),

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("write failed: {0}")]
    Write(String),
}

impl MailboxError {
    /// A missing table is the only condition the publish loop survives.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, MailboxError::MissingTable(_))
    }
}

/// Invalid settings, detected before anything is opened.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid table name '{0}': expected letters, digits and underscores")]
    InvalidTable(String),

    #[error("the sqlite backend needs a database path (--sqlite-path)")]
    MissingSqlitePath,

    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Result type alias for application-level operations
pub type Result<T> = anyhow::Result<T>;
