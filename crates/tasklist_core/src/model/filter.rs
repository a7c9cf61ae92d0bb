//! View filter over the task collection.
//!
//! # Invariants
//! - Filtering never mutates or reorders tasks.
//! - `All` is the default selector and is never persisted.

use crate::model::task::{Priority, Task};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// View criterion chosen by the presentation layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum FilterSelector {
    #[default]
    All,
    Active,
    Completed,
    High,
    Medium,
    Low,
}

impl FilterSelector {
    pub const ALL: [FilterSelector; 6] = [
        Self::All,
        Self::Active,
        Self::Completed,
        Self::High,
        Self::Medium,
        Self::Low,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Active => "active",
            Self::Completed => "completed",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    fn priority(self) -> Option<Priority> {
        match self {
            Self::High => Some(Priority::High),
            Self::Medium => Some(Priority::Medium),
            Self::Low => Some(Priority::Low),
            Self::All | Self::Active | Self::Completed => None,
        }
    }
}

impl Display for FilterSelector {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterSelector {
    type Err = UnknownFilter;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|selector| selector.as_str() == normalized)
            .ok_or_else(|| UnknownFilter(value.to_string()))
    }
}

/// Returned when a filter name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownFilter(pub String);

impl Display for UnknownFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unknown filter `{}`; expected all|active|completed|high|medium|low",
            self.0
        )
    }
}

impl Error for UnknownFilter {}

/// Returns whether `task` is visible under `selector`.
pub fn matches(task: &Task, selector: FilterSelector) -> bool {
    match selector {
        FilterSelector::All => true,
        FilterSelector::Active => !task.completed,
        FilterSelector::Completed => task.completed,
        priority_selector => priority_selector.priority() == Some(task.priority),
    }
}

/// Returns the visible tasks in insertion order.
pub fn apply<'a, I>(tasks: I, selector: FilterSelector) -> Vec<&'a Task>
where
    I: IntoIterator<Item = &'a Task>,
{
    tasks
        .into_iter()
        .filter(|task| matches(task, selector))
        .collect()
}
