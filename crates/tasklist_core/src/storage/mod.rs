//! Durable key-value slot holding the serialized task collection.
//!
//! # Responsibility
//! - Define the gateway contract used by `TaskStore` for load and write-back.
//! - Provide the SQLite-backed gateway, plus an in-memory fake behind the
//!   `test-util` feature.
//!
//! # Invariants
//! - A gateway reads and writes exactly one fixed key.
//! - Writes always carry a full collection snapshot, never a delta.

pub mod gateway;
#[cfg(any(test, feature = "test-util"))]
pub mod memory;
pub mod sqlite;

pub use gateway::{GatewayError, GatewayResult, PersistenceGateway, STORAGE_KEY};
#[cfg(any(test, feature = "test-util"))]
pub use memory::MemoryGateway;
pub use sqlite::SqliteGateway;
