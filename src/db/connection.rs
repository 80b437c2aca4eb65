use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use directories::BaseDirs;
use rusqlite::Connection;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".contact-book-manager";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "contacts.sqlite";

/// Open the on-disk database in its default location and make sure the schema
/// exists. This is the one-time startup entry point; the returned connection
/// is handed to the app state and lives for the rest of the process.
pub fn open_store() -> Result<Connection> {
    open_store_at(&db_path()?)
}

/// Open (or create) a database at an explicit path. Split out from
/// [`open_store`] so tests can point at throwaway files instead of the user's
/// real contact book.
pub fn open_store_at(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create data directory")?;
    }

    let conn = Connection::open(path).context("failed to open SQLite database")?;
    ensure_schema(&conn)?;
    Ok(conn)
}

/// Idempotently create the contacts table. Safe to call before any write: if
/// the table already exists this is a no-op, and after [`clear_contacts`] it
/// brings back an empty table.
///
/// [`clear_contacts`]: crate::db::clear_contacts
pub fn ensure_schema(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS contacts (
            id INTEGER PRIMARY KEY NOT NULL,
            name TEXT,
            phone TEXT,
            email TEXT,
            address TEXT,
            relation TEXT
        )",
        [],
    )
    .context("failed to create contacts table")?;

    Ok(())
}

/// Resolve the absolute path to the SQLite database inside the user's home.
fn db_path() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME).join(DB_FILE_NAME))
}
