//! Runtime wiring for the brain dump lifecycle.
//!
//! # Responsibility
//! - Assemble store, completion client, processor, worker pool and service.
//! - Own the worker pool so shutdown drains pending analysis.
//! - Reschedule records left unprocessed by an earlier run.
//!
//! # Invariants
//! - The service and the processor share one repository instance.
//! - The service only sees the pool through the `TaskQueue` contract.
//! - Every unprocessed record gets a task on startup, so a task lost with
//!   the previous process is redelivered.

use crate::config::AnalysisConfig;
use crate::db::{open_db, DbError};
use crate::llm::{CompletionClient, LlmError, OpenAiCompatClient};
use crate::queue::{QueueError, Task, TaskQueue, WorkerPool, WorkerPoolConfig};
use crate::repo::brain_dump_repo::{BrainDumpRepository, RepoError, SqliteBrainDumpRepository};
use crate::service::brain_dump_service::BrainDumpService;
use crate::service::processor::BrainDumpProcessor;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Startup failures.
#[derive(Debug)]
pub enum AppError {
    Db(DbError),
    Llm(LlmError),
    Queue(QueueError),
    Repo(RepoError),
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "database startup failed: {err}"),
            Self::Llm(err) => write!(f, "completion client startup failed: {err}"),
            Self::Queue(err) => write!(f, "worker pool startup failed: {err}"),
            Self::Repo(err) => write!(f, "pending analysis recovery failed: {err}"),
        }
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Llm(err) => Some(err),
            Self::Queue(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<DbError> for AppError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<LlmError> for AppError {
    fn from(value: LlmError) -> Self {
        Self::Llm(value)
    }
}

impl From<QueueError> for AppError {
    fn from(value: QueueError) -> Self {
        Self::Queue(value)
    }
}

impl From<RepoError> for AppError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Running brain dump lifecycle: user-facing service plus background workers.
pub struct BrainDumpApp<R: BrainDumpRepository + 'static> {
    service: BrainDumpService<R>,
    pool: Arc<WorkerPool>,
}

impl BrainDumpApp<SqliteBrainDumpRepository> {
    /// Opens the SQLite store at `db_path` and starts analysis workers.
    pub fn start(
        db_path: impl AsRef<Path>,
        analysis: AnalysisConfig,
        pool_config: WorkerPoolConfig,
    ) -> Result<Self, AppError> {
        let conn = open_db(db_path)?;
        let repo = Arc::new(SqliteBrainDumpRepository::new(conn));
        let client: Arc<dyn CompletionClient> = Arc::new(OpenAiCompatClient::new(analysis)?);
        Self::with_parts(repo, client, pool_config)
    }
}

impl<R: BrainDumpRepository + 'static> BrainDumpApp<R> {
    /// Wires caller-supplied store and completion backends.
    ///
    /// Records still unprocessed in `repo` are queued again once the pool is
    /// running.
    pub fn with_parts(
        repo: Arc<R>,
        client: Arc<dyn CompletionClient>,
        pool_config: WorkerPoolConfig,
    ) -> Result<Self, AppError> {
        let processor = Arc::new(BrainDumpProcessor::new(Arc::clone(&repo), client));
        let pool = Arc::new(WorkerPool::start(pool_config, processor)?);

        let pending = repo.list_unprocessed_ids()?;
        for brain_dump_id in &pending {
            pool.enqueue(
                Duration::ZERO,
                Task::ProcessBrainDump {
                    brain_dump_id: *brain_dump_id,
                },
            )?;
        }

        let queue: Arc<dyn TaskQueue> = pool.clone();
        let service = BrainDumpService::new(repo, queue);

        info!(
            "event=app_start module=app status=ok workers={} rescheduled={}",
            pool_config.workers,
            pending.len()
        );
        Ok(Self { service, pool })
    }

    pub fn service(&self) -> &BrainDumpService<R> {
        &self.service
    }

    /// Stops accepting new analysis work and waits for queued tasks.
    pub fn shutdown(&self) {
        self.pool.shutdown();
    }
}
