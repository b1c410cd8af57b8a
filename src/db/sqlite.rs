//! SQLite mailbox.
//!
//! The database file must already exist and contain the mailbox table; the
//! file is opened read-write and never created. `ts` is written as the client
//! wall clock (UTC) at the moment of the write.

use std::path::Path;
use std::time::Duration;

use chrono::Utc;
use rusqlite::{params, Connection, ErrorCode, OpenFlags};
use tracing::debug;

use super::{update_sql, Mailbox};
use crate::commands::Command;
use crate::error::MailboxError;

/// How long a write waits for a reader holding the database lock.
const BUSY_TIMEOUT: Duration = Duration::from_secs(2);

pub struct SqliteMailbox {
    conn: Connection,
    table: String,
    sql: String,
}

impl SqliteMailbox {
    pub fn open(path: &Path, table: &str) -> Result<Self, MailboxError> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| MailboxError::Connection(format!("{}: {}", path.display(), e)))?;
        conn.busy_timeout(BUSY_TIMEOUT)
            .map_err(|e| MailboxError::Connection(e.to_string()))?;
        Ok(Self::from_connection(conn, table))
    }

    /// Wrap an already open connection (in-memory databases in tests).
    pub fn from_connection(conn: Connection, table: &str) -> Self {
        Self {
            conn,
            table: table.to_string(),
            sql: update_sql(table, "?1", "?2"),
        }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl Mailbox for SqliteMailbox {
    fn publish(&mut self, command: Command) -> Result<u64, MailboxError> {
        let changed = self
            .conn
            .execute(&self.sql, params![command.code(), Utc::now()])
            .map_err(|e| classify(&self.table, e))?;
        if changed == 0 {
            debug!("Mailbox table '{}' has no row, write was a no-op", self.table);
        }
        Ok(changed as u64)
    }
}

fn classify(table: &str, err: rusqlite::Error) -> MailboxError {
    let message = err.to_string();
    if message.contains("no such table") {
        return MailboxError::MissingTable(table.to_string());
    }

    match err.sqlite_error_code() {
        Some(
            ErrorCode::CannotOpen
            | ErrorCode::SystemIoFailure
            | ErrorCode::NotADatabase
            | ErrorCode::DatabaseCorrupt,
        ) => MailboxError::Connection(message),
        _ => MailboxError::Write(message),
    }
}
