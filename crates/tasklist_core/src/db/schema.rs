//! `kv_store` schema setup and legacy slot import.
//!
//! Databases written by the first app release keep the task blob in the
//! AsyncStorage table `catalystLocalStorage`. Creating `kv_store` copies that
//! row over once, so the first launch restores the old list.

use crate::storage::gateway::{GatewayError, GatewayResult, STORAGE_KEY};
use log::info;
use rusqlite::Connection;

/// Version written to `PRAGMA user_version` once `kv_store` exists.
pub const SCHEMA_VERSION: u32 = 1;

/// AsyncStorage table used by the first app release.
pub const LEGACY_TABLE: &str = "catalystLocalStorage";

const KV_STORE_SQL: &str = include_str!("kv_store.sql");

/// Creates `kv_store` on a fresh database and imports the legacy task slot.
///
/// # Errors
/// - `SchemaTooNew` when the file was written by a newer build.
/// - `Sqlite` when DDL or the import fails; nothing is committed then.
pub fn ensure_schema(conn: &mut Connection) -> GatewayResult<()> {
    let version = user_version(conn)?;
    if version > SCHEMA_VERSION {
        return Err(GatewayError::SchemaTooNew {
            db_version: version,
            latest_supported: SCHEMA_VERSION,
        });
    }
    if version == SCHEMA_VERSION {
        return Ok(());
    }

    let tx = conn.transaction()?;
    tx.execute_batch(KV_STORE_SQL)?;
    let imported = import_legacy_slot(&tx)?;
    tx.execute_batch(&format!("PRAGMA user_version = {SCHEMA_VERSION};"))?;
    tx.commit()?;

    info!(
        "event=db_schema module=db status=ok from_version={version} to_version={SCHEMA_VERSION} legacy_imported={imported}"
    );
    Ok(())
}

pub fn user_version(conn: &Connection) -> GatewayResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}

fn import_legacy_slot(conn: &Connection) -> GatewayResult<bool> {
    let has_legacy_table: bool = conn.query_row(
        "SELECT EXISTS(
            SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1
        );",
        [LEGACY_TABLE],
        |row| row.get(0),
    )?;
    if !has_legacy_table {
        return Ok(false);
    }

    let copied = conn.execute(
        &format!(
            "INSERT OR IGNORE INTO kv_store (key, value)
             SELECT key, value FROM {LEGACY_TABLE} WHERE key = ?1;"
        ),
        [STORAGE_KEY],
    )?;
    Ok(copied > 0)
}
