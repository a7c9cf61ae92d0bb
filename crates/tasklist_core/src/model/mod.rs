//! Task list domain model.
//!
//! # Responsibility
//! - Define the persisted task record and its priority tiers.
//! - Define the view filter applied by presentation layers.
//!
//! # Invariants
//! - Every task is identified by a stable `TaskId`.
//! - Deletion is a hard removal; ids are never reused.

pub mod filter;
pub mod task;
