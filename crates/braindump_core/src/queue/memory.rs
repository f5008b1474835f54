//! In-memory task queue for callers that drive execution themselves.

use super::{QueueResult, Task, TaskHandler, TaskQueue};
use log::error;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// One task recorded by `InMemoryTaskQueue`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTask {
    pub delay: Duration,
    pub task: Task,
}

/// FIFO queue that holds tasks until explicitly drained.
///
/// Delays are recorded but not waited on.
#[derive(Debug, Default)]
pub struct InMemoryTaskQueue {
    pending: Mutex<VecDeque<PendingTask>>,
}

impl InMemoryTaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of queued tasks in enqueue order.
    pub fn pending(&self) -> Vec<PendingTask> {
        self.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Removes and returns all queued tasks.
    pub fn drain(&self) -> Vec<PendingTask> {
        self.lock().drain(..).collect()
    }

    /// Runs queued tasks on the calling thread until the queue is empty.
    ///
    /// Tasks enqueued by the handler are run in the same call. Handler errors
    /// are logged and do not stop the drain. Returns the number of tasks run.
    pub fn run_pending(&self, handler: &dyn TaskHandler) -> usize {
        let mut ran = 0;
        loop {
            let next = self.lock().pop_front();
            let Some(pending) = next else {
                return ran;
            };
            if let Err(err) = handler.handle(&pending.task) {
                error!(
                    "event=task_run module=queue status=error task={} error={}",
                    pending.task.name(),
                    err
                );
            }
            ran += 1;
        }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<PendingTask>> {
        match self.pending.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl TaskQueue for InMemoryTaskQueue {
    fn enqueue(&self, delay: Duration, task: Task) -> QueueResult<()> {
        self.lock().push_back(PendingTask { delay, task });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::InMemoryTaskQueue;
    use crate::queue::{Task, TaskError, TaskHandler, TaskQueue};
    use std::sync::Mutex;
    use std::time::Duration;
    use uuid::Uuid;

    #[derive(Default)]
    struct CountingHandler {
        handled: Mutex<Vec<Task>>,
    }

    impl TaskHandler for CountingHandler {
        fn handle(&self, task: &Task) -> Result<(), TaskError> {
            self.handled.lock().expect("lock").push(task.clone());
            Err("always fails".into())
        }
    }

    #[test]
    fn records_tasks_in_order_with_delay() {
        let queue = InMemoryTaskQueue::new();
        let first = Task::ProcessBrainDump {
            brain_dump_id: Uuid::new_v4(),
        };
        let second = Task::ProcessBrainDump {
            brain_dump_id: Uuid::new_v4(),
        };
        queue.enqueue(Duration::ZERO, first.clone()).expect("first");
        queue
            .enqueue(Duration::from_secs(1), second.clone())
            .expect("second");

        let pending = queue.pending();
        assert_eq!(pending.len(), 2);
        assert_eq!(pending[0].task, first);
        assert_eq!(pending[1].delay, Duration::from_secs(1));
        assert_eq!(queue.drain().len(), 2);
        assert!(queue.is_empty());
    }

    #[test]
    fn run_pending_continues_past_handler_errors() {
        let queue = InMemoryTaskQueue::new();
        for _ in 0..3 {
            queue
                .enqueue(
                    Duration::ZERO,
                    Task::ProcessBrainDump {
                        brain_dump_id: Uuid::new_v4(),
                    },
                )
                .expect("enqueue");
        }

        let handler = CountingHandler::default();
        assert_eq!(queue.run_pending(&handler), 3);
        assert_eq!(handler.handled.lock().expect("lock").len(), 3);
        assert!(queue.is_empty());
    }
}
