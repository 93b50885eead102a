use rusqlite::{Connection, OptionalExtension};
use std::path::Path;
use tracing::{debug, info};

use crate::error::Result;

mod contact_logs;
mod properties;
mod schema;

pub use schema::SCHEMA_VERSION;

/// SQLite-backed lead store.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open database at `path`, creating it if needed, running migrations
    pub fn open_at(path: &Path) -> Result<Self> {
        // Create parent directories
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        debug!(path = %path.display(), "opened database");

        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open in-memory database for testing
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Bring the schema up to [`SCHEMA_VERSION`]. Tables and the version row
    /// are written in one transaction.
    fn migrate(&self) -> Result<()> {
        let version = self.schema_version()?;
        if version >= SCHEMA_VERSION {
            debug!(version, "schema up to date");
            return Ok(());
        }

        let tx = self.conn.unchecked_transaction()?;
        tx.execute_batch(schema::SCHEMA_V1)?;
        tx.execute(
            "INSERT OR REPLACE INTO schema_version (id, version) VALUES (1, ?)",
            [SCHEMA_VERSION],
        )?;
        tx.commit()?;

        info!(from = version, to = SCHEMA_VERSION, "database schema migrated");
        Ok(())
    }

    /// Stored schema version; 0 for a fresh file.
    fn schema_version(&self) -> Result<i32> {
        let has_table: bool = self.conn.query_row(
            "SELECT EXISTS (SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'schema_version')",
            [],
            |row| row.get(0),
        )?;
        if !has_table {
            return Ok(0);
        }

        let version = self
            .conn
            .query_row("SELECT version FROM schema_version WHERE id = 1", [], |row| row.get(0))
            .optional()?;
        Ok(version.unwrap_or(0))
    }
}
