//! Task store: the single authoritative task collection.
//!
//! # Responsibility
//! - Load the persisted collection once at startup.
//! - Apply add/remove/edit/toggle mutations in memory.
//! - Write the full collection back after every state change.
//!
//! # Invariants
//! - Insertion order is preserved; removal never reorders survivors.
//! - Mutations on unknown ids and blank adds are silent no-ops and do not write.
//! - Each state change issues exactly one write, in mutation order.
//! - Storage and decode failures never escape `load` or a mutation; the
//!   in-memory collection stays authoritative.

use crate::codec::{decode_tasks, encode_tasks, CodecError};
use crate::model::filter::{self, FilterSelector};
use crate::model::task::{Priority, Task, TaskDraft, TaskId};
use crate::storage::gateway::{GatewayError, PersistenceGateway};
use log::{debug, error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Why the persisted collection could not be restored.
#[derive(Debug)]
pub enum LoadError {
    Storage(GatewayError),
    Malformed(CodecError),
}

impl Display for LoadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Storage(err) => write!(f, "{err}"),
            Self::Malformed(err) => write!(f, "{err}"),
        }
    }
}

impl Error for LoadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            Self::Malformed(err) => Some(err),
        }
    }
}

/// Failure of an explicit `flush`.
#[derive(Debug)]
pub enum StoreError {
    Storage(GatewayError),
    Encode(CodecError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Storage(err) => write!(f, "{err}"),
            Self::Encode(err) => write!(f, "failed to encode tasks: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            Self::Encode(err) => Some(err),
        }
    }
}

impl From<GatewayError> for StoreError {
    fn from(value: GatewayError) -> Self {
        Self::Storage(value)
    }
}

impl From<CodecError> for StoreError {
    fn from(value: CodecError) -> Self {
        Self::Encode(value)
    }
}

/// Result of `TaskStore::load`.
#[derive(Debug)]
pub enum LoadOutcome {
    /// Nothing was stored yet; the collection starts empty.
    FirstRun,
    /// The stored collection was restored.
    Restored { count: usize },
    /// Stored data could not be read or decoded; the collection starts empty.
    Recovered(LoadError),
}

impl LoadOutcome {
    pub fn is_recovered(&self) -> bool {
        matches!(self, Self::Recovered(_))
    }
}

/// Per-status totals of the collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskCounts {
    pub total: usize,
    pub active: usize,
    pub completed: usize,
}

/// Single-owner task collection with write-back persistence.
pub struct TaskStore<G: PersistenceGateway> {
    gateway: G,
    tasks: Vec<Task>,
    dirty: bool,
}

impl<G: PersistenceGateway> TaskStore<G> {
    /// Creates an empty store. Call `load` before serving reads.
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            tasks: Vec::new(),
            dirty: false,
        }
    }

    /// Replaces the in-memory collection with the persisted one.
    ///
    /// Never fails: unreadable or malformed data leaves an empty collection
    /// and is reported through `LoadOutcome::Recovered`.
    pub fn load(&mut self) -> LoadOutcome {
        let started_at = Instant::now();
        info!(
            "event=tasks_load module=store status=start key={}",
            self.gateway.key()
        );

        self.dirty = false;
        let outcome = match self.gateway.read_all() {
            Ok(None) => {
                self.tasks = Vec::new();
                LoadOutcome::FirstRun
            }
            Ok(Some(raw)) => match decode_tasks(&raw) {
                Ok(tasks) => {
                    let count = tasks.len();
                    self.tasks = tasks;
                    LoadOutcome::Restored { count }
                }
                Err(err) => {
                    self.tasks = Vec::new();
                    LoadOutcome::Recovered(LoadError::Malformed(err))
                }
            },
            Err(err) => {
                self.tasks = Vec::new();
                LoadOutcome::Recovered(LoadError::Storage(err))
            }
        };

        match &outcome {
            LoadOutcome::Recovered(err) => error!(
                "event=tasks_load module=store status=error duration_ms={} error_code={} error={}",
                started_at.elapsed().as_millis(),
                load_error_code(err),
                err
            ),
            _ => info!(
                "event=tasks_load module=store status=ok duration_ms={} count={} first_run={}",
                started_at.elapsed().as_millis(),
                self.tasks.len(),
                matches!(outcome, LoadOutcome::FirstRun)
            ),
        }

        outcome
    }

    /// Current tasks in insertion order.
    pub fn list(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| &task.id == id)
    }

    /// Tasks visible under `selector`, in insertion order.
    pub fn filtered(&self, selector: FilterSelector) -> Vec<&Task> {
        filter::apply(&self.tasks, selector)
    }

    pub fn counts(&self) -> TaskCounts {
        let completed = self.tasks.iter().filter(|task| task.completed).count();
        TaskCounts {
            total: self.tasks.len(),
            active: self.tasks.len() - completed,
            completed,
        }
    }

    /// Appends a new open, medium-priority task.
    ///
    /// Returns `None` without writing when `text` is blank after trimming.
    pub fn add(&mut self, text: impl Into<String>) -> Option<Task> {
        let task = match Task::new(text) {
            Ok(task) => task,
            Err(err) => {
                debug!("event=task_add module=store status=noop reason={err}");
                return None;
            }
        };

        self.tasks.push(task.clone());
        debug!(
            "event=task_add module=store status=ok task_id={} count={}",
            task.id,
            self.tasks.len()
        );
        self.write_back("task_add");
        Some(task)
    }

    /// Removes the task with `id`.
    ///
    /// Returns whether a task was removed; removing an absent id is a no-op.
    pub fn remove(&mut self, id: &TaskId) -> bool {
        let Some(index) = self.position(id, "task_remove") else {
            return false;
        };

        self.tasks.remove(index);
        debug!(
            "event=task_remove module=store status=ok task_id={id} count={}",
            self.tasks.len()
        );
        self.write_back("task_remove");
        true
    }

    /// Replaces text and priority of the task with `id`.
    ///
    /// `id` and `completed` are left untouched. Returns whether a task matched.
    pub fn edit(&mut self, id: &TaskId, text: impl Into<String>, priority: Priority) -> bool {
        let Some(index) = self.position(id, "task_edit") else {
            return false;
        };

        let task = &mut self.tasks[index];
        task.text = text.into();
        task.priority = priority;
        debug!("event=task_edit module=store status=ok task_id={id} priority={priority}");
        self.write_back("task_edit");
        true
    }

    /// Commits a presentation-layer editing draft through `edit`.
    pub fn commit_draft(&mut self, draft: &TaskDraft) -> bool {
        self.edit(&draft.id, draft.text.clone(), draft.priority)
    }

    /// Flips the completion flag of the task with `id`.
    pub fn toggle_complete(&mut self, id: &TaskId) -> bool {
        let Some(index) = self.position(id, "task_toggle") else {
            return false;
        };

        let task = &mut self.tasks[index];
        task.toggle();
        debug!(
            "event=task_toggle module=store status=ok task_id={id} completed={}",
            task.completed
        );
        self.write_back("task_toggle");
        true
    }

    /// Writes the current snapshot now.
    ///
    /// The store never retries a failed write-back on its own; callers use
    /// this after `is_dirty` reports a pending snapshot.
    pub fn flush(&mut self) -> Result<(), StoreError> {
        let result = self.persist();
        self.dirty = result.is_err();
        result
    }

    /// Whether the latest write-back failed and no later write succeeded.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    fn position(&self, id: &TaskId, event: &str) -> Option<usize> {
        let index = self.tasks.iter().position(|task| &task.id == id);
        if index.is_none() {
            debug!("event={event} module=store status=noop reason=unknown_id task_id={id}");
        }
        index
    }

    fn persist(&self) -> Result<(), StoreError> {
        let serialized = encode_tasks(&self.tasks)?;
        self.gateway.write_all(&serialized)?;
        Ok(())
    }

    fn write_back(&mut self, trigger: &str) {
        let started_at = Instant::now();
        match self.persist() {
            Ok(()) => {
                if self.dirty {
                    info!("event=tasks_write module=store status=recovered trigger={trigger}");
                }
                self.dirty = false;
                debug!(
                    "event=tasks_write module=store status=ok trigger={trigger} duration_ms={} count={}",
                    started_at.elapsed().as_millis(),
                    self.tasks.len()
                );
            }
            Err(err) => {
                self.dirty = true;
                error!(
                    "event=tasks_write module=store status=error trigger={trigger} duration_ms={} error_code=write_back_failed error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                warn!(
                    "event=tasks_write module=store status=dirty count={}",
                    self.tasks.len()
                );
            }
        }
    }
}

fn load_error_code(err: &LoadError) -> &'static str {
    match err {
        LoadError::Storage(_) => "storage_unavailable",
        LoadError::Malformed(_) => "malformed_persisted_data",
    }
}
