//! Background task scheduling.
//!
//! # Responsibility
//! - Define the tasks core schedules and the queue/handler contracts.
//! - Provide a thread-backed worker pool and an in-memory queue.
//!
//! # Invariants
//! - `enqueue` never blocks on task execution.
//! - A task accepted by a queue is handed to a handler at least once unless
//!   the queue is shut down first.

use crate::model::brain_dump::BrainDumpId;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

pub mod memory;
pub mod worker_pool;

pub use memory::InMemoryTaskQueue;
pub use worker_pool::{WorkerPool, WorkerPoolConfig};

pub type QueueResult<T> = Result<T, QueueError>;

/// Error type returned by task handlers.
pub type TaskError = Box<dyn Error + Send + Sync>;

/// Unit of background work, carrying its own payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    /// Run analysis for one brain dump.
    ProcessBrainDump { brain_dump_id: BrainDumpId },
}

impl Task {
    /// Stable task name used in log events.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ProcessBrainDump { .. } => "process_brain_dump",
        }
    }
}

/// Queue errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    /// Queue no longer accepts tasks.
    Closed,
    /// Worker pool configuration is unusable.
    InvalidConfig(String),
    /// A worker thread could not be started.
    Spawn(String),
}

impl Display for QueueError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Closed => write!(f, "task queue is closed"),
            Self::InvalidConfig(message) => write!(f, "invalid worker pool config: {message}"),
            Self::Spawn(message) => write!(f, "failed to spawn worker: {message}"),
        }
    }
}

impl Error for QueueError {}

/// Accepts tasks for later execution.
pub trait TaskQueue: Send + Sync {
    /// Schedules `task` to run no earlier than `delay` from now.
    fn enqueue(&self, delay: Duration, task: Task) -> QueueResult<()>;
}

/// Executes dequeued tasks.
pub trait TaskHandler: Send + Sync {
    fn handle(&self, task: &Task) -> Result<(), TaskError>;
}
