//! Brain dump use-case service.
//!
//! # Responsibility
//! - Provide user-facing create/list/get entry points.
//! - Schedule background analysis for every created record.
//!
//! # Invariants
//! - Create requires an identity and performs no write without one.
//! - Reads never reveal records owned by another identity: they return an
//!   empty list or `None` instead of an error.

use crate::model::brain_dump::{BrainDump, BrainDumpId, UserId};
use crate::queue::{QueueError, Task, TaskQueue};
use crate::repo::brain_dump_repo::{BrainDumpRepository, RepoError};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Duration;

/// Maximum number of records returned by `list_recent`.
pub const RECENT_LIMIT: u32 = 10;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service error for user-facing brain dump operations.
#[derive(Debug)]
pub enum ServiceError {
    /// Caller has no authenticated identity.
    AuthenticationRequired,
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Record was stored but background analysis could not be scheduled.
    Queue {
        brain_dump_id: BrainDumpId,
        source: QueueError,
    },
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationRequired => {
                write!(f, "must be logged in to create a brain dump")
            }
            Self::Repo(err) => write!(f, "{err}"),
            Self::Queue {
                brain_dump_id,
                source,
            } => write!(
                f,
                "failed to schedule processing for brain dump {brain_dump_id}: {source}"
            ),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::AuthenticationRequired => None,
            Self::Repo(err) => Some(err),
            Self::Queue { source, .. } => Some(source),
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Service facade over repository and task queue implementations.
pub struct BrainDumpService<R: BrainDumpRepository> {
    repo: Arc<R>,
    queue: Arc<dyn TaskQueue>,
}

impl<R: BrainDumpRepository> BrainDumpService<R> {
    /// Creates a service sharing `repo` with background processing.
    pub fn new(repo: Arc<R>, queue: Arc<dyn TaskQueue>) -> Self {
        Self { repo, queue }
    }

    /// Stores a new brain dump and schedules its analysis.
    ///
    /// # Contract
    /// - `identity == None` fails with `AuthenticationRequired` before any write.
    /// - The stored record is unprocessed with empty analysis fields.
    /// - Exactly one `Task::ProcessBrainDump` is enqueued with zero delay.
    /// - Returns the new record ID without waiting for analysis.
    pub fn create(
        &self,
        identity: Option<&UserId>,
        original_text: impl Into<String>,
    ) -> ServiceResult<BrainDumpId> {
        let Some(owner) = identity else {
            info!("event=brain_dump_create module=service status=denied reason=unauthenticated");
            return Err(ServiceError::AuthenticationRequired);
        };

        let record = BrainDump::new(owner.clone(), original_text);
        let brain_dump_id = self.repo.insert(&record)?;

        if let Err(err) = self
            .queue
            .enqueue(Duration::ZERO, Task::ProcessBrainDump { brain_dump_id })
        {
            error!(
                "event=brain_dump_create module=service status=error brain_dump_id={} error_code=enqueue_failed error={}",
                brain_dump_id, err
            );
            return Err(ServiceError::Queue {
                brain_dump_id,
                source: err,
            });
        }

        info!(
            "event=brain_dump_create module=service status=ok brain_dump_id={} text_chars={}",
            brain_dump_id,
            record.original_text.chars().count()
        );
        Ok(brain_dump_id)
    }

    /// Lists the caller's most recent brain dumps, newest first.
    ///
    /// Returns an empty list for unauthenticated callers.
    pub fn list_recent(&self, identity: Option<&UserId>) -> ServiceResult<Vec<BrainDump>> {
        match identity {
            None => Ok(Vec::new()),
            Some(owner) => Ok(self.repo.list_recent_by_owner(owner, RECENT_LIMIT)?),
        }
    }

    /// Gets one brain dump owned by the caller.
    ///
    /// Returns `None` when the caller is unauthenticated, the record does not
    /// exist, or it belongs to someone else. The three cases are
    /// indistinguishable to the caller.
    pub fn get(
        &self,
        identity: Option<&UserId>,
        id: BrainDumpId,
    ) -> ServiceResult<Option<BrainDump>> {
        let Some(caller) = identity else {
            return Ok(None);
        };

        match self.repo.get(id)? {
            Some(record) if record.is_owned_by(caller) => Ok(Some(record)),
            _ => Ok(None),
        }
    }
}
