//! Core use-case services.
//!
//! # Responsibility
//! - Own the task collection and orchestrate write-back through a gateway.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod task_store;
