//! Task value type handled by the scheduler.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Caller-assigned task identifier.
pub type TaskId = i64;

/// Task priority. Higher = more important = extracted first.
pub type Priority = i64;

/// A schedulable task.
///
/// The default value `(0, 0)` is the sentinel returned by
/// [`Scheduler::get_task_or_default`](super::Scheduler::get_task_or_default)
/// when nothing is queued.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub priority: Priority,
}

impl Task {
    pub fn new(id: TaskId, priority: Priority) -> Self {
        Self { id, priority }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.id, self.priority)
    }
}
