//! Task domain model.
//!
//! # Responsibility
//! - Define the single persisted record of the task list.
//! - Provide creation and mutation helpers that keep field invariants.
//!
//! # Invariants
//! - `id` is generated once and never changes or gets reused.
//! - A task is only ever created with non-blank `text`.
//! - `priority` defaults to `medium` and `completed` to `false`, both at
//!   creation and when absent from older persisted records.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Opaque stable identifier of a task.
///
/// Persisted as a plain string so ids written by other producers keep
/// working; new ids are UUID v4 text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Generates a fresh unique id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for TaskId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for TaskId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Priority tier of a task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    /// Stable lowercase name, identical to the persisted form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl Display for Priority {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = UnknownPriority;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            _ => Err(UnknownPriority(value.to_string())),
        }
    }
}

/// Returned when a priority name is not one of `high|medium|low`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPriority(pub String);

impl Display for UnknownPriority {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unknown priority `{}`; expected high|medium|low",
            self.0
        )
    }
}

impl Error for UnknownPriority {}

/// Validation errors raised by task constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    /// Text is empty after trimming surrounding whitespace.
    EmptyText,
    /// A persisted record carries neither `text` nor legacy `value`.
    MissingText,
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyText => write!(f, "task text must not be empty"),
            Self::MissingText => write!(f, "missing field `text`"),
        }
    }
}

impl Error for TaskValidationError {}

/// One entry of the task list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TaskRecord")]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    pub priority: Priority,
    pub completed: bool,
}

/// Persisted shape accepted on read.
///
/// Records written by the first app release carry `value` instead of
/// `text`; when both are present `text` wins.
#[derive(Deserialize)]
struct TaskRecord {
    id: TaskId,
    text: Option<String>,
    value: Option<String>,
    #[serde(default)]
    priority: Priority,
    #[serde(default)]
    completed: bool,
}

impl TryFrom<TaskRecord> for Task {
    type Error = TaskValidationError;

    fn try_from(record: TaskRecord) -> Result<Self, Self::Error> {
        let text = record
            .text
            .or(record.value)
            .ok_or(TaskValidationError::MissingText)?;
        Ok(Self {
            id: record.id,
            text,
            priority: record.priority,
            completed: record.completed,
        })
    }
}

impl Task {
    /// Creates a new open task with a generated id and medium priority.
    ///
    /// # Errors
    /// - `EmptyText` when `text` is blank after trimming.
    pub fn new(text: impl Into<String>) -> Result<Self, TaskValidationError> {
        Self::with_id(TaskId::generate(), text)
    }

    /// Creates a new open task with a caller-provided id.
    ///
    /// Used by import paths where identity already exists.
    pub fn with_id(id: TaskId, text: impl Into<String>) -> Result<Self, TaskValidationError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(TaskValidationError::EmptyText);
        }
        Ok(Self {
            id,
            text,
            priority: Priority::default(),
            completed: false,
        })
    }

    /// Flips the completion flag.
    pub fn toggle(&mut self) {
        self.completed = !self.completed;
    }

    /// Returns whether the task is still open.
    pub fn is_active(&self) -> bool {
        !self.completed
    }
}

/// Editing snapshot held by a presentation layer while a task is mid-edit.
///
/// The store never sees a draft until it is committed with
/// `TaskStore::commit_draft`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub id: TaskId,
    pub text: String,
    pub priority: Priority,
}

impl TaskDraft {
    pub fn from_task(task: &Task) -> Self {
        Self {
            id: task.id.clone(),
            text: task.text.clone(),
            priority: task.priority,
        }
    }
}
