//! Core lifecycle for brain dump records.
//!
//! A brain dump is created unprocessed, analyzed in the background by a
//! language model, and patched exactly once with either the model's analysis
//! or a fixed fallback. This crate is the single source of truth for those
//! rules.

pub mod app;
pub mod config;
pub mod db;
pub mod llm;
pub mod logging;
pub mod model;
pub mod queue;
pub mod repo;
pub mod service;

pub use app::{AppError, BrainDumpApp};
pub use config::{AnalysisConfig, ConfigError};
pub use llm::{CompletionClient, LlmError, LlmResult, OpenAiCompatClient};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::brain_dump::{Analysis, BrainDump, BrainDumpId, BrainDumpValidationError, UserId};
pub use queue::{
    InMemoryTaskQueue, QueueError, Task, TaskError, TaskHandler, TaskQueue, WorkerPool,
    WorkerPoolConfig,
};
pub use repo::brain_dump_repo::{
    BrainDumpRepository, RepoError, RepoResult, SqliteBrainDumpRepository,
};
pub use service::analysis::{build_analysis_prompt, parse_analysis, AnalysisParseError};
pub use service::brain_dump_service::{
    BrainDumpService, ServiceError, ServiceResult, RECENT_LIMIT,
};
pub use service::processor::{BrainDumpProcessor, ProcessError, ProcessOutcome};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
