//! SQLite-backed persistence gateway.
//!
//! # Invariants
//! - Connections come from `db::open_db*`, so `kv_store` exists.
//! - A write replaces the whole value under the key in one statement.

use crate::db::{open_db, open_db_in_memory};
use crate::storage::gateway::{GatewayResult, PersistenceGateway, STORAGE_KEY};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// Gateway storing the serialized collection in the `kv_store` table.
pub struct SqliteGateway {
    conn: Connection,
    key: String,
}

impl SqliteGateway {
    /// Wraps a migrated connection using the default `tasks` key.
    pub fn new(conn: Connection) -> Self {
        Self::with_key(conn, STORAGE_KEY)
    }

    /// Wraps a migrated connection using a caller-provided key.
    pub fn with_key(conn: Connection, key: impl Into<String>) -> Self {
        Self {
            conn,
            key: key.into(),
        }
    }

    /// Opens (or creates) a database file and wraps it.
    pub fn open(path: impl AsRef<Path>) -> GatewayResult<Self> {
        Ok(Self::new(open_db(path)?))
    }

    /// Opens a private in-memory database and wraps it.
    pub fn open_in_memory() -> GatewayResult<Self> {
        Ok(Self::new(open_db_in_memory()?))
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl PersistenceGateway for SqliteGateway {
    fn key(&self) -> &str {
        self.key.as_str()
    }

    fn read_all(&self) -> GatewayResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1;",
                [self.key.as_str()],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn write_all(&self, serialized: &str) -> GatewayResult<()> {
        self.conn.execute(
            "INSERT INTO kv_store (key, value, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![self.key.as_str(), serialized],
        )?;
        Ok(())
    }
}
