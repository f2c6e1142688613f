//! Replayable operation scripts.
//!
//! A script is a YAML list of scheduler operations:
//!
//! ```yaml
//! - add: { id: 1, priority: 10 }
//! - change: { id: 1, priority: 100 }
//! - peek
//! - get
//! - len
//! ```
//!
//! Replaying it against a [`Scheduler`] yields one [`Outcome`] per operation.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::SchedulerConfig;
use crate::error::{Result, TaskheapError};
use crate::scheduler::{Priority, Scheduler, Task, TaskId};

/// One scripted scheduler call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Op {
    Add { id: TaskId, priority: Priority },
    Change { id: TaskId, priority: Priority },
    Get,
    Peek,
    Len,
}

/// Result of replaying one [`Op`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Outcome {
    Added { task: Task },
    Changed { id: TaskId, priority: Priority, applied: bool },
    Got { task: Option<Task> },
    Peeked { task: Option<Task> },
    Len { len: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    ops: Vec<Op>,
}

impl Script {
    pub fn new(ops: Vec<Op>) -> Self {
        Self { ops }
    }

    /// Parse a script from YAML text.
    ///
    /// Operations are written as single-key maps (`add: {...}`) or bare names
    /// (`get`), not as `!add` tags.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let ops: Vec<Op> =
            serde_yaml::with::singleton_map_recursive::deserialize(serde_yaml::Deserializer::from_str(content))?;
        if ops.is_empty() {
            return Err(TaskheapError::Script("script contains no operations".to_string()));
        }
        Ok(Self { ops })
    }

    /// Load a script from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)?;
        let script = Self::from_yaml_str(&content)?;
        log::debug!("Loaded {} operations from {}", script.ops.len(), path.as_ref().display());
        Ok(script)
    }

    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    /// Apply every operation in order.
    ///
    /// Stops at the first failing `add` and returns its error; operations
    /// already applied stay applied.
    pub fn run(&self, scheduler: &mut Scheduler) -> Result<Vec<Outcome>> {
        let mut outcomes = Vec::with_capacity(self.ops.len());

        for op in &self.ops {
            let outcome = match *op {
                Op::Add { id, priority } => {
                    let task = Task::new(id, priority);
                    scheduler.add_task(task)?;
                    Outcome::Added { task }
                }
                Op::Change { id, priority } => Outcome::Changed {
                    id,
                    priority,
                    applied: scheduler.change_task_priority(id, priority),
                },
                Op::Get => Outcome::Got {
                    task: scheduler.get_task(),
                },
                Op::Peek => Outcome::Peeked {
                    task: scheduler.peek().copied(),
                },
                Op::Len => Outcome::Len { len: scheduler.len() },
            };
            outcomes.push(outcome);
        }

        Ok(outcomes)
    }
}

/// A finished replay: the outcomes and the scheduler they were applied to.
#[derive(Debug)]
pub struct Replay {
    pub outcomes: Vec<Outcome>,
    pub scheduler: Scheduler,
}

impl Replay {
    /// One compact JSON object per outcome, in replay order.
    pub fn json_lines(&self) -> Result<Vec<String>> {
        self.outcomes
            .iter()
            .map(|outcome| serde_json::to_string(outcome).map_err(TaskheapError::from))
            .collect()
    }
}

/// Load the script at `path` and replay it against a scheduler built from `config`.
pub fn replay_file<P: AsRef<Path>>(path: P, config: &SchedulerConfig) -> Result<Replay> {
    let script = Script::load(&path)?;
    let mut scheduler = Scheduler::from_config(config);
    let outcomes = script.run(&mut scheduler)?;
    tracing::debug!(ops = outcomes.len(), remaining = scheduler.len(), "Replay finished");
    Ok(Replay { outcomes, scheduler })
}
