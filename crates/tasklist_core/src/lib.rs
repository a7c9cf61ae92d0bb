//! Core task list engine.
//! This crate is the single source of truth for task state and persistence.

pub mod codec;
pub mod db;
pub mod logging;
pub mod model;
pub mod service;
pub mod storage;

pub use codec::{decode_tasks, encode_tasks, CodecError};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::filter::{FilterSelector, UnknownFilter};
pub use model::task::{Priority, Task, TaskDraft, TaskId, TaskValidationError, UnknownPriority};
pub use service::task_store::{LoadError, LoadOutcome, StoreError, TaskCounts, TaskStore};
pub use storage::{GatewayError, GatewayResult, PersistenceGateway, SqliteGateway, STORAGE_KEY};

#[cfg(any(test, feature = "test-util"))]
pub use storage::MemoryGateway;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
