//! Persistence gateway contract.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Fixed storage key of the task collection.
pub const STORAGE_KEY: &str = "tasks";

pub type GatewayResult<T> = Result<T, GatewayError>;

/// The task slot could not be read or written.
///
/// Every variant is a StorageUnavailable condition for `TaskStore`.
#[derive(Debug)]
pub enum GatewayError {
    /// SQLite transport failure on the `kv_store` slot.
    Sqlite(rusqlite::Error),
    /// The database was written by a newer build.
    SchemaTooNew {
        db_version: u32,
        latest_supported: u32,
    },
    /// Backend refused the operation for a non-database reason.
    StorageUnavailable(String),
}

impl Display for GatewayError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "storage unavailable: task slot query failed: {err}"),
            Self::SchemaTooNew {
                db_version,
                latest_supported,
            } => write!(
                f,
                "storage unavailable: task database schema {db_version} is newer than supported {latest_supported}"
            ),
            Self::StorageUnavailable(reason) => write!(f, "storage unavailable: {reason}"),
        }
    }
}

impl Error for GatewayError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::SchemaTooNew { .. } | Self::StorageUnavailable(_) => None,
        }
    }
}

impl From<rusqlite::Error> for GatewayError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Whole-collection read/write under one fixed key.
pub trait PersistenceGateway {
    /// Key this gateway reads and writes.
    fn key(&self) -> &str;

    /// Returns the stored blob, or `None` when the key was never written.
    fn read_all(&self) -> GatewayResult<Option<String>>;

    /// Overwrites the key with `serialized`.
    fn write_all(&self, serialized: &str) -> GatewayResult<()>;
}

impl<G: PersistenceGateway + ?Sized> PersistenceGateway for &G {
    fn key(&self) -> &str {
        (**self).key()
    }

    fn read_all(&self) -> GatewayResult<Option<String>> {
        (**self).read_all()
    }

    fn write_all(&self, serialized: &str) -> GatewayResult<()> {
        (**self).write_all(serialized)
    }
}
