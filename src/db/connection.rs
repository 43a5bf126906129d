use std::path::Path;

use rusqlite::{Connection, OpenFlags};
use tracing::{debug, error, info};

use crate::error::Result;

/// Handle over the single SQLite connection. The UI owns exactly one of these
/// and runs every operation through it on the event-loop thread.
pub struct StudentStore {
    pub(super) conn: Connection,
}

impl StudentStore {
    /// Open the existing database file at `path` and make sure the schema
    /// exists. The file is never created here: a missing file, like one SQLite
    /// cannot read as a database, comes back as [`StoreError::Storage`]. An
    /// empty file is a valid empty database.
    ///
    /// [`StoreError::Storage`]: crate::error::StoreError::Storage
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "opening student database");

        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(path, flags).inspect_err(|err| {
            error!(path = %path.display(), %err, "failed to open student database");
        })?;
        Self::bootstrap(conn).inspect_err(|err| {
            error!(path = %path.display(), %err, "failed to prepare student schema");
        })
    }

    /// Same bootstrap over a throwaway in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::bootstrap(conn)
    }

    fn bootstrap(conn: Connection) -> Result<Self> {
        ensure_schema(&conn)?;
        debug!("student schema ready");
        Ok(Self { conn })
    }
}

/// Run the lazy migration. `AUTOINCREMENT` keeps ids of deleted students from
/// ever being handed out again.
fn ensure_schema(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS students (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            age INTEGER NOT NULL,
            grade TEXT NOT NULL DEFAULT ''
        )",
        [],
    )?;
    Ok(())
}
