// Database module - mailbox backends

#[cfg(feature = "postgres")]
pub mod postgres;
pub mod sqlite;

use tracing::info;

use crate::commands::Command;
use crate::config::{Backend, DatabaseSettings};
use crate::error::MailboxError;

#[cfg(feature = "postgres")]
pub use self::postgres::PostgresMailbox;
pub use sqlite::SqliteMailbox;

/// A single-row table used as a latest-value channel.
///
/// Each publish overwrites the row in one autocommitted statement, so a reader
/// sees either the previous command or the new one, never a mix.
pub trait Mailbox {
    /// Overwrite the row with `command`, stamped with the time of the write.
    ///
    /// Returns the number of rows touched. Zero means the row is missing,
    /// which is a no-op rather than an error.
    fn publish(&mut self, command: Command) -> Result<u64, MailboxError>;
}

impl<M: Mailbox + ?Sized> Mailbox for Box<M> {
    fn publish(&mut self, command: Command) -> Result<u64, MailboxError> {
        (**self).publish(command)
    }
}

impl<M: Mailbox + ?Sized> Mailbox for &mut M {
    fn publish(&mut self, command: Command) -> Result<u64, MailboxError> {
        (**self).publish(command)
    }
}

/// The `UPDATE` statement every backend runs, with `timestamp` as the SQL
/// expression (or placeholder) for the `ts` column.
pub(crate) fn update_sql(table: &str, command_param: &str, timestamp: &str) -> String {
    format!("UPDATE {table} SET cmd = {command_param}, ts = {timestamp}")
}

/// Open the mailbox described by `settings`. The connection is held for the
/// lifetime of the returned handle.
pub fn connect(settings: &DatabaseSettings) -> Result<Box<dyn Mailbox>, MailboxError> {
    let mailbox: Box<dyn Mailbox> = match settings.backend {
        Backend::Sqlite => {
            let path = settings.path.as_deref().ok_or_else(|| {
                MailboxError::Connection("no sqlite database path configured".to_string())
            })?;
            Box::new(SqliteMailbox::open(path, &settings.table)?)
        }
        #[cfg(feature = "postgres")]
        Backend::Postgres => Box::new(PostgresMailbox::connect(settings)?),
        #[cfg(not(feature = "postgres"))]
        Backend::Postgres => {
            return Err(MailboxError::Connection(
                "built without PostgreSQL support (enable the `postgres` feature)".to_string(),
            ))
        }
    };
    info!("Connected to mailbox at {}", settings.target());
    Ok(mailbox)
}
