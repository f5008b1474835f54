//! Externally supplied configuration.
//!
//! # Responsibility
//! - Carry language-model endpoint settings into the completion client.
//! - Read those settings from process environment for embedders.
//!
//! # Invariants
//! - Base URL and API key are passed through as given; core does not
//!   validate them beyond presence.

use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::time::Duration;

/// Environment variable holding the language-model base URL.
pub const ENV_LLM_BASE_URL: &str = "BRAINDUMP_LLM_BASE_URL";
/// Environment variable holding the language-model API key.
pub const ENV_LLM_API_KEY: &str = "BRAINDUMP_LLM_API_KEY";
/// Optional environment variable holding a request timeout in seconds.
pub const ENV_LLM_TIMEOUT_SECS: &str = "BRAINDUMP_LLM_TIMEOUT_SECS";

/// Model used for brain dump analysis.
pub const DEFAULT_MODEL: &str = "gpt-4.1-nano";
/// Sampling temperature used for brain dump analysis.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Configuration load errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    MissingVar(&'static str),
    InvalidVar { name: &'static str, value: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingVar(name) => write!(f, "missing environment variable `{name}`"),
            Self::InvalidVar { name, value } => {
                write!(f, "invalid value `{value}` for environment variable `{name}`")
            }
        }
    }
}

impl Error for ConfigError {}

/// Settings for the chat-completions endpoint used by analysis.
#[derive(Clone, PartialEq)]
pub struct AnalysisConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    /// `None` keeps the blocking HTTP client default of 30 seconds.
    pub timeout: Option<Duration>,
}

impl fmt::Debug for AnalysisConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalysisConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl AnalysisConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            timeout: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Reads configuration from the process environment.
    ///
    /// # Errors
    /// - `MissingVar` when base URL or API key is unset.
    /// - `InvalidVar` when the timeout is not a whole number of seconds.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup(ENV_LLM_BASE_URL).ok_or(ConfigError::MissingVar(ENV_LLM_BASE_URL))?;
        let api_key = lookup(ENV_LLM_API_KEY).ok_or(ConfigError::MissingVar(ENV_LLM_API_KEY))?;
        let mut config = Self::new(base_url, api_key);

        if let Some(raw) = lookup(ENV_LLM_TIMEOUT_SECS) {
            let secs = raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidVar {
                    name: ENV_LLM_TIMEOUT_SECS,
                    value: raw.clone(),
                })?;
            config = config.with_timeout(Duration::from_secs(secs));
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::{
        AnalysisConfig, ConfigError, DEFAULT_MODEL, ENV_LLM_API_KEY, ENV_LLM_BASE_URL,
        ENV_LLM_TIMEOUT_SECS,
    };
    use std::collections::HashMap;
    use std::time::Duration;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn new_uses_fixed_model_and_temperature() {
        let config = AnalysisConfig::new("http://localhost", "key");
        assert_eq!(config.model, DEFAULT_MODEL);
        assert!((config.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(config.timeout, None);
    }

    #[test]
    fn from_lookup_reads_required_and_optional_values() {
        let config = AnalysisConfig::from_lookup(lookup_from(&[
            (ENV_LLM_BASE_URL, "https://llm.example/v1"),
            (ENV_LLM_API_KEY, "secret"),
            (ENV_LLM_TIMEOUT_SECS, " 30 "),
        ]))
        .expect("config should load");

        assert_eq!(config.base_url, "https://llm.example/v1");
        assert_eq!(config.api_key, "secret");
        assert_eq!(config.timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn from_lookup_reports_missing_variables() {
        let err = AnalysisConfig::from_lookup(lookup_from(&[(ENV_LLM_API_KEY, "secret")]))
            .expect_err("base url is required");
        assert_eq!(err, ConfigError::MissingVar(ENV_LLM_BASE_URL));

        let err = AnalysisConfig::from_lookup(lookup_from(&[(ENV_LLM_BASE_URL, "x")]))
            .expect_err("api key is required");
        assert_eq!(err, ConfigError::MissingVar(ENV_LLM_API_KEY));
    }

    #[test]
    fn debug_output_redacts_api_key() {
        let config = AnalysisConfig::new("http://localhost", "super-secret");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn from_lookup_rejects_non_numeric_timeout() {
        let err = AnalysisConfig::from_lookup(lookup_from(&[
            (ENV_LLM_BASE_URL, "x"),
            (ENV_LLM_API_KEY, "y"),
            (ENV_LLM_TIMEOUT_SECS, "soon"),
        ]))
        .expect_err("timeout must be numeric");
        assert!(matches!(err, ConfigError::InvalidVar { name, .. } if name == ENV_LLM_TIMEOUT_SECS));
    }
}
