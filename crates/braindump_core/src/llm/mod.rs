//! Language-model collaborator.
//!
//! # Responsibility
//! - Define the completion contract used by background analysis.
//! - Provide an HTTP implementation for chat-completions endpoints.
//!
//! # Invariants
//! - Implementations return the raw message content; parsing belongs to
//!   the analysis layer.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod openai;

pub use openai::OpenAiCompatClient;

pub type LlmResult<T> = Result<T, LlmError>;

/// Failures while obtaining a completion.
#[derive(Debug)]
pub enum LlmError {
    /// Client could not be constructed.
    Build(reqwest::Error),
    /// Request could not be sent or the response body could not be read.
    Transport(reqwest::Error),
    /// Endpoint answered with a non-success status.
    Status { status: u16, body: String },
    /// Response body is not the expected completions envelope.
    MalformedResponse(String),
    /// Response carried no choices.
    EmptyChoices,
}

impl Display for LlmError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Build(err) => write!(f, "failed to build http client: {err}"),
            Self::Transport(err) => write!(f, "completion request failed: {err}"),
            Self::Status { status, body } => {
                write!(f, "completion endpoint returned status {status}: {body}")
            }
            Self::MalformedResponse(message) => {
                write!(f, "malformed completion response: {message}")
            }
            Self::EmptyChoices => write!(f, "completion response contained no choices"),
        }
    }
}

impl Error for LlmError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Build(err) | Self::Transport(err) => Some(err),
            _ => None,
        }
    }
}

/// Text completion backend.
pub trait CompletionClient: Send + Sync {
    /// Sends one user prompt and returns the model's message content.
    fn complete(&self, prompt: &str) -> LlmResult<String>;
}
