//! Serialized form of the task collection.
//!
//! # Responsibility
//! - Encode the whole collection as one JSON document.
//! - Decode persisted documents back into an ordered collection.
//!
//! # Invariants
//! - `decode_tasks(encode_tasks(tasks))` yields the same tasks in the same order.
//! - Decoding rejects documents that would break id uniqueness.

use crate::model::task::{Task, TaskId};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type CodecResult<T> = Result<T, CodecError>;

/// Persisted data does not form a valid task collection.
#[derive(Debug)]
pub enum CodecError {
    Json(serde_json::Error),
    DuplicateId(TaskId),
}

impl Display for CodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "malformed task data: {err}"),
            Self::DuplicateId(id) => write!(f, "malformed task data: duplicate id `{id}`"),
        }
    }
}

impl Error for CodecError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::DuplicateId(_) => None,
        }
    }
}

impl From<serde_json::Error> for CodecError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Encodes tasks as a JSON array of flat records.
pub fn encode_tasks(tasks: &[Task]) -> CodecResult<String> {
    Ok(serde_json::to_string(tasks)?)
}

/// Decodes a JSON array of task records.
///
/// Absent `priority`/`completed` fields take their defaults.
///
/// # Errors
/// - `Json` for syntax errors, non-array documents, missing required
///   fields or unknown priority names.
/// - `DuplicateId` when two records share an id.
pub fn decode_tasks(raw: &str) -> CodecResult<Vec<Task>> {
    let tasks: Vec<Task> = serde_json::from_str(raw)?;

    let mut seen = HashSet::with_capacity(tasks.len());
    for task in &tasks {
        if !seen.insert(&task.id) {
            return Err(CodecError::DuplicateId(task.id.clone()));
        }
    }

    Ok(tasks)
}
