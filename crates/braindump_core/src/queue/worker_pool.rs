//! Thread-backed task queue.
//!
//! # Responsibility
//! - Run enqueued tasks on a fixed set of named worker threads.
//! - Drain already-queued tasks and join workers on shutdown.
//!
//! # Invariants
//! - Workers share one FIFO channel; a task is taken by exactly one worker.
//! - A panicking handler does not take its worker thread down.
//! - After `shutdown`, `enqueue` returns `QueueError::Closed`.

use super::{QueueError, QueueResult, Task, TaskHandler, TaskQueue};
use log::{error, info, warn};
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const DEFAULT_WORKERS: usize = 2;

/// Worker pool sizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerPoolConfig {
    pub workers: usize,
}

impl Default for WorkerPoolConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
        }
    }
}

struct ScheduledTask {
    run_at: Instant,
    task: Task,
}

enum WorkerCommand {
    Run(ScheduledTask),
    Shutdown,
}

/// Fixed-size pool of worker threads consuming one task channel.
pub struct WorkerPool {
    sender: Mutex<Option<Sender<WorkerCommand>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl WorkerPool {
    /// Spawns `config.workers` threads that hand every task to `handler`.
    ///
    /// # Errors
    /// - `InvalidConfig` when `config.workers` is zero.
    /// - `Spawn` when a thread cannot be created; already started workers
    ///   are shut down before returning.
    pub fn start(config: WorkerPoolConfig, handler: Arc<dyn TaskHandler>) -> QueueResult<Self> {
        if config.workers == 0 {
            return Err(QueueError::InvalidConfig(
                "workers must be greater than zero".to_string(),
            ));
        }

        let (command_tx, command_rx) = mpsc::channel::<WorkerCommand>();
        let receiver = Arc::new(Mutex::new(command_rx));
        let pool = Self {
            sender: Mutex::new(Some(command_tx)),
            workers: Mutex::new(Vec::with_capacity(config.workers)),
        };

        for index in 0..config.workers {
            let receiver = Arc::clone(&receiver);
            let handler = Arc::clone(&handler);
            let spawned = thread::Builder::new()
                .name(format!("braindump-worker-{index}"))
                .spawn(move || run_worker(index, receiver, handler));

            match spawned {
                Ok(handle) => lock_ignoring_poison(&pool.workers).push(handle),
                Err(err) => {
                    error!(
                        "event=worker_spawn module=queue status=error worker={} error={}",
                        index, err
                    );
                    pool.shutdown();
                    return Err(QueueError::Spawn(err.to_string()));
                }
            }
        }

        info!(
            "event=worker_pool_start module=queue status=ok workers={}",
            config.workers
        );
        Ok(pool)
    }

    /// Stops accepting tasks, lets workers drain the queue, and joins them.
    ///
    /// Calling this more than once is a no-op.
    pub fn shutdown(&self) {
        let Some(sender) = lock_ignoring_poison(&self.sender).take() else {
            return;
        };
        let workers = std::mem::take(&mut *lock_ignoring_poison(&self.workers));

        for _ in 0..workers.len() {
            if sender.send(WorkerCommand::Shutdown).is_err() {
                warn!("event=worker_pool_shutdown module=queue status=warn reason=channel_closed");
                break;
            }
        }
        drop(sender);

        for handle in workers {
            if let Err(join_err) = handle.join() {
                error!(
                    "event=worker_pool_shutdown module=queue status=error error={:?}",
                    join_err
                );
            }
        }
        info!("event=worker_pool_shutdown module=queue status=ok");
    }
}

impl TaskQueue for WorkerPool {
    fn enqueue(&self, delay: Duration, task: Task) -> QueueResult<()> {
        let guard = lock_ignoring_poison(&self.sender);
        let sender = guard.as_ref().ok_or(QueueError::Closed)?;
        let name = task.name();
        sender
            .send(WorkerCommand::Run(ScheduledTask {
                run_at: Instant::now() + delay,
                task,
            }))
            .map_err(|_| QueueError::Closed)?;
        info!(
            "event=task_enqueue module=queue status=ok task={} delay_ms={}",
            name,
            delay.as_millis()
        );
        Ok(())
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_worker(
    index: usize,
    receiver: Arc<Mutex<Receiver<WorkerCommand>>>,
    handler: Arc<dyn TaskHandler>,
) {
    loop {
        let command = lock_ignoring_poison(&receiver).recv();
        match command {
            Ok(WorkerCommand::Run(scheduled)) => execute(index, scheduled, handler.as_ref()),
            Ok(WorkerCommand::Shutdown) | Err(_) => break,
        }
    }
    info!("event=worker_stop module=queue status=ok worker={}", index);
}

fn execute(index: usize, scheduled: ScheduledTask, handler: &dyn TaskHandler) {
    let wait = scheduled.run_at.saturating_duration_since(Instant::now());
    if !wait.is_zero() {
        thread::sleep(wait);
    }

    let started_at = Instant::now();
    let task = scheduled.task;
    match panic::catch_unwind(AssertUnwindSafe(|| handler.handle(&task))) {
        Ok(Ok(())) => info!(
            "event=task_run module=queue status=ok worker={} task={} duration_ms={}",
            index,
            task.name(),
            started_at.elapsed().as_millis()
        ),
        Ok(Err(err)) => error!(
            "event=task_run module=queue status=error worker={} task={} duration_ms={} error={}",
            index,
            task.name(),
            started_at.elapsed().as_millis(),
            err
        ),
        Err(_) => error!(
            "event=task_run module=queue status=panic worker={} task={}",
            index,
            task.name()
        ),
    }
}

fn lock_ignoring_poison<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
