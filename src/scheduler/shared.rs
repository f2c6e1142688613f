//! Thread-safe scheduler handle.
//!
//! Every operation runs to completion under a single mutex, so heap and
//! index updates are never visible halfway through.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::Result;
use crate::scheduler::heap::{Scheduler, SchedulerSnapshot};
use crate::scheduler::task::{Priority, Task, TaskId};

/// Cloneable, lock-guarded [`Scheduler`].
#[derive(Debug, Clone, Default)]
pub struct SharedScheduler {
    inner: Arc<Mutex<Scheduler>>,
}

impl SharedScheduler {
    pub fn new(scheduler: Scheduler) -> Self {
        Self {
            inner: Arc::new(Mutex::new(scheduler)),
        }
    }

    // Operations never leave the heap half-updated, so a poisoned lock still
    // guards a consistent scheduler.
    fn lock(&self) -> MutexGuard<'_, Scheduler> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add_task(&self, task: Task) -> Result<()> {
        self.lock().add_task(task)
    }

    pub fn change_task_priority(&self, id: TaskId, new_priority: Priority) -> bool {
        self.lock().change_task_priority(id, new_priority)
    }

    pub fn get_task(&self) -> Option<Task> {
        self.lock().get_task()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn snapshot(&self) -> SchedulerSnapshot {
        self.lock().snapshot()
    }

    pub fn check_invariants(&self) -> Result<()> {
        self.lock().check_invariants()
    }

    /// Run several operations under one lock acquisition.
    pub fn with<R>(&self, f: impl FnOnce(&mut Scheduler) -> R) -> R {
        f(&mut self.lock())
    }
}
