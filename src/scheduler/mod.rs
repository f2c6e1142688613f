//! Scheduler module for task ordering and selection.
//!
//! This module provides:
//! - **Scheduler**: mutable-priority max-heap with an id -> slot index, giving
//!   O(log n) insertion, priority change and extraction.
//! - **SharedScheduler**: mutex-guarded handle for multi-threaded callers.
//! - **SchedulerService**: tokio task owning a scheduler, driven over channels.
//!
//! Running the extracted task is the caller's business.
//!
//! # Example
//!
//! ```
//! use taskheap::scheduler::{Scheduler, Task};
//!
//! let mut scheduler = Scheduler::new();
//! scheduler.add_task(Task::new(1, 10))?;
//! scheduler.add_task(Task::new(2, 20))?;
//!
//! scheduler.change_task_priority(1, 100);
//!
//! // Ordered by the new priority, returned as submitted
//! assert_eq!(scheduler.get_task(), Some(Task::new(1, 10)));
//! assert_eq!(scheduler.get_task(), Some(Task::new(2, 20)));
//! assert_eq!(scheduler.get_task(), None);
//! # Ok::<(), taskheap::TaskheapError>(())
//! ```

mod heap;
mod service;
mod shared;
mod task;

pub use heap::{Scheduler, SchedulerSnapshot};
pub use service::{SchedulerHandle, SchedulerService};
pub use shared::SharedScheduler;
pub use task::{Priority, Task, TaskId};
