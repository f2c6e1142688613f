//! Indexed max-heap scheduler.
//!
//! Tasks live in a dense `Vec` laid out as an implicit binary tree
//! (`parent(i) = (i - 1) / 2`, children `2i + 1` and `2i + 2`). A side map
//! from task id to slot index is rewritten on every swap, so a priority change
//! finds its task in O(1) and repairs the heap in O(log n).
//!
//! A second map keeps each task as it was submitted. Extraction hands back
//! that submission record, so a task whose priority was raised after
//! insertion still comes out carrying its original priority. The live
//! priority only decides ordering; use [`Scheduler::peek`] or
//! [`Scheduler::current_priority`] to observe it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::{DuplicatePolicy, SchedulerConfig};
use crate::error::{Result, TaskheapError};
use crate::scheduler::task::{Priority, Task, TaskId};

fn parent(i: usize) -> usize {
    (i - 1) / 2
}

fn left_child(i: usize) -> usize {
    2 * i + 1
}

fn right_child(i: usize) -> usize {
    2 * i + 2
}

/// Serializable view of the heap slots in array order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerSnapshot {
    pub slots: Vec<Task>,
}

/// Mutable-priority max-heap keyed by task id.
///
/// Not thread-safe. Wrap it in [`SharedScheduler`](super::SharedScheduler) or
/// hand it to [`SchedulerService`](super::SchedulerService) to share it.
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    /// Live entries; priorities here may differ from the submission records.
    heap: Vec<Task>,
    /// Task as originally added, returned on extraction.
    submitted: HashMap<TaskId, Task>,
    /// Task id -> slot in `heap`.
    index: HashMap<TaskId, usize>,
    policy: DuplicatePolicy,
}

impl Scheduler {
    /// Create an empty scheduler that rejects duplicate ids.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty scheduler with room for `capacity` tasks.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: Vec::with_capacity(capacity),
            submitted: HashMap::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
            policy: DuplicatePolicy::default(),
        }
    }

    /// Create a scheduler from configuration.
    pub fn from_config(config: &SchedulerConfig) -> Self {
        Self::with_capacity(config.initial_capacity).with_policy(config.duplicate_policy)
    }

    /// Set how duplicate ids are handled by `add_task`.
    pub fn with_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> DuplicatePolicy {
        self.policy
    }

    /// Number of queued tasks.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn contains(&self, id: TaskId) -> bool {
        self.index.contains_key(&id)
    }

    /// Queue a task.
    ///
    /// If `task.id` is already queued, `DuplicatePolicy::Reject` returns
    /// `DuplicateTask` without touching anything; `DuplicatePolicy::Replace`
    /// overwrites the submission record and moves the live entry to the new
    /// priority.
    pub fn add_task(&mut self, task: Task) -> Result<()> {
        if self.index.contains_key(&task.id) {
            return match self.policy {
                DuplicatePolicy::Reject => Err(TaskheapError::DuplicateTask(task.id)),
                DuplicatePolicy::Replace => {
                    tracing::debug!(id = task.id, priority = task.priority, "Replacing queued task");
                    self.submitted.insert(task.id, task);
                    self.change_task_priority(task.id, task.priority);
                    Ok(())
                }
            };
        }

        let idx = self.heap.len();
        self.heap.push(task);
        self.submitted.insert(task.id, task);
        self.index.insert(task.id, idx);
        self.sift_up(idx);

        tracing::trace!(id = task.id, priority = task.priority, len = self.heap.len(), "Task added");
        Ok(())
    }

    /// Change the live priority of a queued task.
    ///
    /// Returns `false` without doing anything when the id is not queued or the
    /// priority is unchanged. The submission record is never modified.
    pub fn change_task_priority(&mut self, id: TaskId, new_priority: Priority) -> bool {
        let Some(&idx) = self.index.get(&id) else {
            return false;
        };

        let old_priority = self.heap[idx].priority;
        if new_priority == old_priority {
            return false;
        }

        self.heap[idx].priority = new_priority;
        if new_priority > old_priority {
            self.sift_up(idx);
        } else {
            self.sift_down(idx);
        }

        tracing::trace!(id, old_priority, new_priority, "Task priority changed");
        true
    }

    /// Remove the task with the highest live priority.
    ///
    /// Returns its submission record (original priority), or `None` when
    /// empty. Order among equal priorities is unspecified.
    pub fn get_task(&mut self) -> Option<Task> {
        let last = self.heap.len().checked_sub(1)?;
        self.swap(0, last);

        let live = self.heap.pop()?;
        self.index.remove(&live.id);

        if !self.heap.is_empty() {
            self.sift_down(0);
        }

        tracing::trace!(id = live.id, priority = live.priority, len = self.heap.len(), "Task extracted");
        Some(self.submitted.remove(&live.id).unwrap_or(live))
    }

    /// Like [`get_task`](Self::get_task) but returns `Task::default()` when empty.
    pub fn get_task_or_default(&mut self) -> Task {
        self.get_task().unwrap_or_default()
    }

    /// Live root entry, carrying its current priority.
    pub fn peek(&self) -> Option<&Task> {
        self.heap.first()
    }

    /// Current (possibly changed) priority of a queued task.
    pub fn current_priority(&self, id: TaskId) -> Option<Priority> {
        self.index.get(&id).map(|&idx| self.heap[idx].priority)
    }

    /// Submission record of a queued task.
    pub fn submitted(&self, id: TaskId) -> Option<&Task> {
        if self.contains(id) { self.submitted.get(&id) } else { None }
    }

    /// Heap slots in array order (heap-ordered, not sorted).
    pub fn tasks(&self) -> &[Task] {
        &self.heap
    }

    pub fn snapshot(&self) -> SchedulerSnapshot {
        SchedulerSnapshot {
            slots: self.heap.clone(),
        }
    }

    /// Drop every queued task.
    pub fn clear(&mut self) {
        self.heap.clear();
        self.submitted.clear();
        self.index.clear();
    }

    /// Extract tasks one by one until empty.
    pub fn drain(&mut self) -> impl Iterator<Item = Task> + '_ {
        std::iter::from_fn(move || self.get_task())
    }

    /// Verify heap order, index consistency and submission-record coverage.
    pub fn check_invariants(&self) -> Result<()> {
        if self.index.len() != self.heap.len() {
            return Err(TaskheapError::InvariantViolation(format!(
                "index holds {} ids for {} slots",
                self.index.len(),
                self.heap.len()
            )));
        }

        for (i, task) in self.heap.iter().enumerate() {
            match self.index.get(&task.id) {
                Some(&idx) if idx == i => {}
                Some(&idx) => {
                    return Err(TaskheapError::InvariantViolation(format!(
                        "task {} sits in slot {} but index says {}",
                        task.id, i, idx
                    )));
                }
                None => {
                    return Err(TaskheapError::InvariantViolation(format!("task {} missing from index", task.id)));
                }
            }

            if !self.submitted.contains_key(&task.id) {
                return Err(TaskheapError::InvariantViolation(format!(
                    "task {} has no submission record",
                    task.id
                )));
            }

            if i > 0 && task.priority > self.heap[parent(i)].priority {
                return Err(TaskheapError::InvariantViolation(format!(
                    "slot {} (priority {}) outranks its parent slot {} (priority {})",
                    i,
                    task.priority,
                    parent(i),
                    self.heap[parent(i)].priority
                )));
            }
        }

        if self.submitted.len() != self.heap.len() {
            return Err(TaskheapError::InvariantViolation(format!(
                "{} submission records for {} slots",
                self.submitted.len(),
                self.heap.len()
            )));
        }

        Ok(())
    }

    fn sift_up(&mut self, mut idx: usize) {
        while idx > 0 {
            let p = parent(idx);
            if self.heap[idx].priority <= self.heap[p].priority {
                break;
            }
            self.swap(idx, p);
            idx = p;
        }
    }

    fn sift_down(&mut self, mut idx: usize) {
        let len = self.heap.len();
        loop {
            let left = left_child(idx);
            let right = right_child(idx);
            let mut biggest = idx;

            if left < len && self.heap[left].priority > self.heap[biggest].priority {
                biggest = left;
            }
            if right < len && self.heap[right].priority > self.heap[biggest].priority {
                biggest = right;
            }

            if biggest == idx {
                break;
            }
            self.swap(idx, biggest);
            idx = biggest;
        }
    }

    /// Swap two slots and repoint both ids in the index.
    fn swap(&mut self, a: usize, b: usize) {
        self.heap.swap(a, b);
        self.index.insert(self.heap[a].id, a);
        self.index.insert(self.heap[b].id, b);
    }
}
