//! FFI bridge exposing the task store to UI hosts.

pub mod api;
