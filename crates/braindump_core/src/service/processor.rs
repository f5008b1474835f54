//! Background analysis of stored brain dumps.
//!
//! # Responsibility
//! - Turn one unprocessed record into a processed one.
//! - Absorb every language-model failure by writing the fallback analysis.
//!
//! # Invariants
//! - Reads bypass ownership checks; this path is internal only.
//! - A record that exists when processing starts always ends `processed`.
//! - A missing record is reported as `ProcessError::NotFound` and nothing is
//!   written.

use crate::llm::CompletionClient;
use crate::logging::sanitize_message;
use crate::model::brain_dump::{Analysis, BrainDumpId};
use crate::queue::{Task, TaskError, TaskHandler};
use crate::repo::brain_dump_repo::{BrainDumpRepository, RepoError};
use crate::service::analysis::{build_analysis_prompt, parse_analysis};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Instant;

const MAX_LOGGED_ERROR_CHARS: usize = 200;

/// How a processed record obtained its analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// Fields came from the model response.
    Analyzed,
    /// Fields came from the fixed fallback analysis.
    Fallback,
}

impl ProcessOutcome {
    fn as_str(self) -> &'static str {
        match self {
            Self::Analyzed => "analyzed",
            Self::Fallback => "fallback",
        }
    }
}

/// Fatal processing errors. Analysis failures never appear here.
#[derive(Debug)]
pub enum ProcessError {
    NotFound(BrainDumpId),
    Repo(RepoError),
}

impl Display for ProcessError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "brain dump not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ProcessError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NotFound(_) => None,
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<RepoError> for ProcessError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Runs analysis for records handed over by the task queue.
pub struct BrainDumpProcessor<R: BrainDumpRepository> {
    repo: Arc<R>,
    client: Arc<dyn CompletionClient>,
}

impl<R: BrainDumpRepository> BrainDumpProcessor<R> {
    pub fn new(repo: Arc<R>, client: Arc<dyn CompletionClient>) -> Self {
        Self { repo, client }
    }

    /// Analyzes one record and writes the result.
    ///
    /// # Contract
    /// - Missing record: `Err(NotFound)`, no write.
    /// - Model success: the four parsed fields are written verbatim.
    /// - Any model, transport or parse failure: the fallback analysis is
    ///   written. The failure is logged, not returned.
    /// - Either way `processed` becomes `true` with one write. Re-running on a
    ///   processed record overwrites its fields.
    pub fn process(&self, id: BrainDumpId) -> Result<ProcessOutcome, ProcessError> {
        let started_at = Instant::now();
        let record = self.repo.get(id)?.ok_or(ProcessError::NotFound(id))?;

        let (analysis, outcome) = match self.request_analysis(&record.original_text) {
            Ok(analysis) => (analysis, ProcessOutcome::Analyzed),
            Err(err) => {
                warn!(
                    "event=brain_dump_analysis module=processor status=fallback brain_dump_id={} error={}",
                    id,
                    sanitize_message(&err.to_string(), MAX_LOGGED_ERROR_CHARS)
                );
                (Analysis::fallback(), ProcessOutcome::Fallback)
            }
        };

        if let Err(err) = self.repo.complete_analysis(id, &analysis) {
            error!(
                "event=brain_dump_process module=processor status=error brain_dump_id={} error_code=complete_failed error={}",
                id, err
            );
            return Err(err.into());
        }

        info!(
            "event=brain_dump_process module=processor status=ok brain_dump_id={} outcome={} duration_ms={}",
            id,
            outcome.as_str(),
            started_at.elapsed().as_millis()
        );
        Ok(outcome)
    }

    fn request_analysis(&self, original_text: &str) -> Result<Analysis, Box<dyn Error>> {
        let prompt = build_analysis_prompt(original_text);
        let content = self.client.complete(&prompt)?;
        Ok(parse_analysis(&content)?)
    }
}

impl<R: BrainDumpRepository> TaskHandler for BrainDumpProcessor<R> {
    fn handle(&self, task: &Task) -> Result<(), TaskError> {
        match task {
            Task::ProcessBrainDump { brain_dump_id } => {
                self.process(*brain_dump_id)?;
                Ok(())
            }
        }
    }
}
