//! OpenAI-compatible chat-completions client.
//!
//! Sends `POST {base_url}/chat/completions` with bearer authentication and
//! returns `choices[0].message.content`.

use super::{CompletionClient, LlmError, LlmResult};
use crate::config::AnalysisConfig;
use reqwest::blocking::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

const MAX_ERROR_BODY_CHARS: usize = 512;

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

/// Blocking HTTP client for OpenAI-compatible endpoints.
pub struct OpenAiCompatClient {
    config: AnalysisConfig,
    client: Client,
}

impl OpenAiCompatClient {
    /// Builds a client from endpoint configuration.
    ///
    /// # Errors
    /// - `LlmError::Build` when the HTTP backend cannot be initialized.
    pub fn new(config: AnalysisConfig) -> LlmResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(LlmError::Build)?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

impl CompletionClient for OpenAiCompatClient {
    fn complete(&self, prompt: &str) -> LlmResult<String> {
        let request = ChatRequest {
            model: self.config.model.as_str(),
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.config.temperature,
        };

        let response = self
            .client
            .post(self.endpoint())
            .header(AUTHORIZATION, format!("Bearer {}", self.config.api_key))
            .header(CONTENT_TYPE, "application/json")
            .json(&request)
            .send()
            .map_err(LlmError::Transport)?;

        let status = response.status();
        let body = response.text().map_err(LlmError::Transport)?;

        if !status.is_success() {
            return Err(LlmError::Status {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        let parsed: ChatResponse = serde_json::from_str(&body)
            .map_err(|err| LlmError::MalformedResponse(err.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(LlmError::EmptyChoices)
    }
}
