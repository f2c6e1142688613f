//! taskheap - An indexed priority scheduler
//!
//! A max-heap of tasks whose priorities can be changed after insertion in
//! logarithmic time, with replayable operation scripts for tracing behaviour.

pub mod config;
pub mod error;
pub mod scheduler;
pub mod script;

pub use config::{Config, DuplicatePolicy};
pub use error::{Result, TaskheapError};
pub use scheduler::{Scheduler, SchedulerHandle, SchedulerService, SharedScheduler, Task};
