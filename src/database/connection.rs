//! The linkbook SQLite file.
//!
//! A [`Database`] is only handed out once the link and group tables exist at
//! the current schema version. File databases run in WAL mode with a busy
//! timeout, so a second reader (a backup tool, the sqlite3 shell) does not
//! fail the engine's writes outright.

use std::path::Path;
use std::time::Duration;

use rusqlite::Connection;

use super::migrations;

/// How long a write waits on a lock held by another connection.
pub const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// A migrated linkbook database.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens or creates the database file at `path`, then migrates it.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, rusqlite::Error> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        // journal_mode returns the resulting mode as a row.
        let mode: String = conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
        tracing::debug!(journal_mode = %mode, "opened database file");
        Self::migrated(conn)
    }

    /// A private in-memory database, gone when dropped.
    pub fn open_in_memory() -> Result<Self, rusqlite::Error> {
        Self::migrated(Connection::open_in_memory()?)
    }

    fn migrated(conn: Connection) -> Result<Self, rusqlite::Error> {
        migrations::run_all(&conn)?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Hands the connection to a record store.
    pub fn into_connection(self) -> Connection {
        self.conn
    }
}
