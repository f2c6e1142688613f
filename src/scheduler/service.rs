//! Single-owner scheduler task.
//!
//! A tokio task owns the [`Scheduler`] and applies requests one at a time as
//! they arrive over an mpsc channel; each request carries a oneshot sender for
//! its reply. Callers talk to it through a cloneable [`SchedulerHandle`].

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::config::ServiceConfig;
use crate::error::{Result, TaskheapError};
use crate::scheduler::heap::{Scheduler, SchedulerSnapshot};
use crate::scheduler::task::{Priority, Task, TaskId};

/// Request sent from a handle to the owner task.
#[derive(Debug)]
enum Request {
    Add {
        task: Task,
        reply: oneshot::Sender<Result<()>>,
    },
    Change {
        id: TaskId,
        priority: Priority,
        reply: oneshot::Sender<bool>,
    },
    Get {
        reply: oneshot::Sender<Option<Task>>,
    },
    Len {
        reply: oneshot::Sender<usize>,
    },
    Snapshot {
        reply: oneshot::Sender<SchedulerSnapshot>,
    },
    Shutdown,
}

/// Owner task state.
pub struct SchedulerService {
    scheduler: Scheduler,
    rx: mpsc::Receiver<Request>,
}

impl SchedulerService {
    /// Spawn the owner task on the current tokio runtime.
    ///
    /// The join handle resolves to the scheduler once every handle is dropped
    /// or [`SchedulerHandle::shutdown`] is called.
    pub fn spawn(scheduler: Scheduler, channel_capacity: usize) -> (SchedulerHandle, JoinHandle<Scheduler>) {
        let (tx, rx) = mpsc::channel(channel_capacity.max(1));
        let service = Self { scheduler, rx };
        let join = tokio::spawn(service.run());
        (SchedulerHandle { tx }, join)
    }

    /// Spawn with settings from configuration.
    pub fn spawn_with_config(scheduler: Scheduler, config: &ServiceConfig) -> (SchedulerHandle, JoinHandle<Scheduler>) {
        Self::spawn(scheduler, config.channel_capacity)
    }

    async fn run(mut self) -> Scheduler {
        tracing::debug!("Scheduler service started");

        while let Some(request) = self.rx.recv().await {
            // A dropped reply receiver means the caller gave up; the
            // operation has still been applied.
            match request {
                Request::Add { task, reply } => {
                    let _ = reply.send(self.scheduler.add_task(task));
                }
                Request::Change { id, priority, reply } => {
                    let _ = reply.send(self.scheduler.change_task_priority(id, priority));
                }
                Request::Get { reply } => {
                    let _ = reply.send(self.scheduler.get_task());
                }
                Request::Len { reply } => {
                    let _ = reply.send(self.scheduler.len());
                }
                Request::Snapshot { reply } => {
                    let _ = reply.send(self.scheduler.snapshot());
                }
                Request::Shutdown => break,
            }
        }

        tracing::debug!(remaining = self.scheduler.len(), "Scheduler service stopped");
        self.scheduler
    }
}

/// Cloneable client for a running [`SchedulerService`].
#[derive(Debug, Clone)]
pub struct SchedulerHandle {
    tx: mpsc::Sender<Request>,
}

impl SchedulerHandle {
    async fn request<T>(&self, make: impl FnOnce(oneshot::Sender<T>) -> Request) -> Result<T> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(make(reply))
            .await
            .map_err(|_| TaskheapError::ServiceClosed)?;
        rx.await.map_err(|_| TaskheapError::ServiceClosed)
    }

    pub async fn add_task(&self, task: Task) -> Result<()> {
        self.request(|reply| Request::Add { task, reply }).await?
    }

    pub async fn change_task_priority(&self, id: TaskId, priority: Priority) -> Result<bool> {
        self.request(|reply| Request::Change { id, priority, reply }).await
    }

    pub async fn get_task(&self) -> Result<Option<Task>> {
        self.request(|reply| Request::Get { reply }).await
    }

    pub async fn len(&self) -> Result<usize> {
        self.request(|reply| Request::Len { reply }).await
    }

    pub async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }

    pub async fn snapshot(&self) -> Result<SchedulerSnapshot> {
        self.request(|reply| Request::Snapshot { reply }).await
    }

    /// Ask the owner task to stop after the requests already queued.
    pub async fn shutdown(&self) -> Result<()> {
        self.tx
            .send(Request::Shutdown)
            .await
            .map_err(|_| TaskheapError::ServiceClosed)
    }

    /// Whether the owner task has stopped receiving.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
