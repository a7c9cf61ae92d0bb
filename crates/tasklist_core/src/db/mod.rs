//! SQLite bootstrap for the durable task slot.
//!
//! # Invariants
//! - Gateways only receive connections whose `kv_store` schema is current.
//! - Schema version is tracked via `PRAGMA user_version`.

mod open;
pub mod schema;

pub use open::{open_db, open_db_in_memory};
