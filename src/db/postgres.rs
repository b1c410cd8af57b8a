//! PostgreSQL mailbox, the store the game engine polls in production.
//!
//! The client runs every statement outside an explicit transaction, so each
//! write commits on its own. `ts` comes from the server's
//! `clock_timestamp()`, which is the time the statement executes rather than
//! the start of a transaction.

use postgres::error::SqlState;
use postgres::{Client, Config, NoTls};
use tracing::debug;

use super::{update_sql, Mailbox};
use crate::commands::Command;
use crate::config::DatabaseSettings;
use crate::error::MailboxError;

pub struct PostgresMailbox {
    client: Client,
    table: String,
    sql: String,
}

impl PostgresMailbox {
    pub fn connect(settings: &DatabaseSettings) -> Result<Self, MailboxError> {
        let client = Config::new()
            .host(&settings.host)
            .port(settings.port)
            .dbname(&settings.name)
            .user(&settings.user)
            .password(&settings.password)
            .connect(NoTls)
            .map_err(|e| MailboxError::Connection(e.to_string()))?;

        Ok(Self {
            client,
            table: settings.table.clone(),
            sql: update_sql(&settings.table, "$1::text", "clock_timestamp()"),
        })
    }
}

impl Mailbox for PostgresMailbox {
    fn publish(&mut self, command: Command) -> Result<u64, MailboxError> {
        let changed = self
            .client
            .execute(self.sql.as_str(), &[&command.code()])
            .map_err(|e| classify(&self.table, e))?;
        if changed == 0 {
            debug!("Mailbox table '{}' has no row, write was a no-op", self.table);
        }
        Ok(changed)
    }
}

fn classify(table: &str, err: postgres::Error) -> MailboxError {
    match err.code() {
        Some(state) if *state == SqlState::UNDEFINED_TABLE => {
            MailboxError::MissingTable(table.to_string())
        }
        Some(state) if is_connection_state(state.code()) => {
            MailboxError::Connection(err.to_string())
        }
        // No SQLSTATE means the failure happened below the protocol level.
        None => MailboxError::Connection(err.to_string()),
        Some(_) if err.is_closed() => MailboxError::Connection(err.to_string()),
        Some(_) => MailboxError::Write(err.to_string()),
    }
}

/// Connection exceptions (class 08) and operator intervention such as a
/// server shutdown (class 57P).
fn is_connection_state(code: &str) -> bool {
    code.starts_with("08") || code.starts_with("57P")
}
