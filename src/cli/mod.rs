use std::path::PathBuf;

use clap::Parser;

use input_bridge::capture::CaptureMode;
use input_bridge::config::{Backend, Settings};

pub mod help;

#[derive(Parser, Debug)]
#[command(name = "input-bridge")]
#[command(
    version,
    about = "Publish terminal keystrokes to a shared database mailbox"
)]
#[command(
    long_about = "Captures arrow keys, WASD, space and P from the terminal and writes the latest command into a single-row table that a game engine polls. Q stops the bridge."
)]
pub struct Cli {
    /// Database host
    #[arg(short = 'H', long)]
    pub host: Option<String>,

    /// Database port
    #[arg(short = 'P', long)]
    pub port: Option<u16>,

    /// Database name
    #[arg(short = 'd', long)]
    pub database: Option<String>,

    /// Database user
    #[arg(short = 'u', long)]
    pub user: Option<String>,

    /// Database password
    #[arg(short = 'p', long)]
    pub password: Option<String>,

    /// Mailbox storage backend
    #[arg(long, value_enum)]
    pub backend: Option<Backend>,

    /// Existing SQLite database file (sqlite backend)
    #[arg(long = "sqlite-path", value_name = "FILE")]
    pub sqlite_path: Option<PathBuf>,

    /// Mailbox table name
    #[arg(long)]
    pub table: Option<String>,

    /// Key capture backend
    #[arg(long, value_enum)]
    pub capture: Option<CaptureMode>,

    /// Config file (defaults to <config dir>/input-bridge/config.toml)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Disable colorized/ANSI output
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Log debug details to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Override file settings with whatever was given on the command line.
    pub fn apply_to(&self, settings: &mut Settings) {
        let db = &mut settings.database;
        if let Some(host) = &self.host {
            db.host = host.clone();
        }
        if let Some(port) = self.port {
            db.port = port;
        }
        if let Some(name) = &self.database {
            db.name = name.clone();
        }
        if let Some(user) = &self.user {
            db.user = user.clone();
        }
        if let Some(password) = &self.password {
            db.password = password.clone();
        }
        if let Some(path) = &self.sqlite_path {
            db.path = Some(path.clone());
            // A database file only makes sense for sqlite.
            if self.backend.is_none() {
                db.backend = Backend::Sqlite;
            }
        }
        if let Some(backend) = self.backend {
            db.backend = backend;
        }
        if let Some(table) = &self.table {
            db.table = table.clone();
        }
        if let Some(mode) = self.capture {
            settings.capture.mode = mode;
        }
    }
}
