//! In-process gateway with failure injection.
//!
//! Holds the slot in memory and records every write, so callers can observe
//! write-back ordering without touching real storage.

use crate::storage::gateway::{GatewayError, GatewayResult, PersistenceGateway, STORAGE_KEY};
use std::cell::{Cell, RefCell};

#[derive(Debug)]
pub struct MemoryGateway {
    key: String,
    slot: RefCell<Option<String>>,
    writes: RefCell<Vec<String>>,
    fail_reads: Cell<bool>,
    fail_writes: Cell<bool>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self {
            key: STORAGE_KEY.to_string(),
            slot: RefCell::new(None),
            writes: RefCell::new(Vec::new()),
            fail_reads: Cell::new(false),
            fail_writes: Cell::new(false),
        }
    }

    /// Starts with `blob` already stored, as if written by a previous session.
    pub fn with_blob(blob: impl Into<String>) -> Self {
        let gateway = Self::new();
        *gateway.slot.borrow_mut() = Some(blob.into());
        gateway
    }

    /// Makes subsequent reads fail with `StorageUnavailable`.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.set(fail);
    }

    /// Makes subsequent writes fail with `StorageUnavailable`.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    /// Current slot content.
    pub fn stored(&self) -> Option<String> {
        self.slot.borrow().clone()
    }

    /// Successful writes in issue order.
    pub fn writes(&self) -> Vec<String> {
        self.writes.borrow().clone()
    }

    pub fn write_count(&self) -> usize {
        self.writes.borrow().len()
    }
}

impl Default for MemoryGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl PersistenceGateway for MemoryGateway {
    fn key(&self) -> &str {
        self.key.as_str()
    }

    fn read_all(&self) -> GatewayResult<Option<String>> {
        if self.fail_reads.get() {
            return Err(GatewayError::StorageUnavailable(format!(
                "read of `{}` refused",
                self.key
            )));
        }
        Ok(self.slot.borrow().clone())
    }

    fn write_all(&self, serialized: &str) -> GatewayResult<()> {
        if self.fail_writes.get() {
            return Err(GatewayError::StorageUnavailable(format!(
                "write of `{}` refused",
                self.key
            )));
        }
        *self.slot.borrow_mut() = Some(serialized.to_string());
        self.writes.borrow_mut().push(serialized.to_string());
        Ok(())
    }
}
