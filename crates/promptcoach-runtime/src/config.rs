//! Process-wide configuration.
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `PROMPT_COACH_MODEL` | `gpt-4o-mini` | Judge model identifier |
//! | `PROMPT_COACH_TIMEOUT` | `30` | Per-request timeout, seconds or humantime (`45s`) |
//! | `PROMPT_COACH_RULES` | unset | YAML file overriding heuristic keyword sets |
//! | `OPENAI_BASE_URL` | `https://api.openai.com/v1` | Chat-completions base URL |
//! | `OPENAI_API_KEY` | unset | Judge credential, required to evaluate |

use std::path::PathBuf;
use std::time::Duration;

use crate::providers::{ApiCredential, CompletionConfig, DEFAULT_OPENAI_BASE_URL};
use crate::CoachError;

pub const MODEL_ENV: &str = "PROMPT_COACH_MODEL";
pub const TIMEOUT_ENV: &str = "PROMPT_COACH_TIMEOUT";
pub const RULES_ENV: &str = "PROMPT_COACH_RULES";
pub const BASE_URL_ENV: &str = "OPENAI_BASE_URL";
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_TEMPERATURE: f32 = 0.2;

/// Configuration for building a [`PromptCoach`](crate::PromptCoach).
#[derive(Debug, Clone)]
pub struct CoachConfig {
    /// Judge model identifier
    pub model: String,

    /// Per-request timeout
    pub timeout: Duration,

    /// Sampling temperature sent on the first attempt
    pub temperature: Option<f32>,

    pub base_url: String,

    /// Optional heuristic rules file
    pub rules_path: Option<PathBuf>,

    /// Judge credential. `None` fails evaluation before any call.
    pub api_key: Option<ApiCredential>,
}

impl Default for CoachConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            temperature: Some(DEFAULT_TEMPERATURE),
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            rules_path: None,
            api_key: None,
        }
    }
}

impl CoachConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, CoachError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through a variable lookup function.
    ///
    /// Unset or blank variables take their defaults. A missing credential is
    /// not an error here; it is reported when an evaluation is attempted.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CoachError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mut config = Self::default();

        if let Some(model) = get(MODEL_ENV) {
            config.model = model.trim().to_string();
        }
        if let Some(raw) = get(TIMEOUT_ENV) {
            config.timeout = parse_timeout(&raw)?;
        }
        if let Some(url) = get(BASE_URL_ENV) {
            config.base_url = url.trim().to_string();
        }
        config.rules_path = get(RULES_ENV).map(PathBuf::from);
        config.api_key = ApiCredential::from_lookup(API_KEY_ENV, "OpenAI API key", &lookup);

        Ok(config)
    }

    /// Set the credential.
    pub fn with_api_key(mut self, credential: ApiCredential) -> Self {
        self.api_key = Some(credential);
        self
    }

    /// Set the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// The credential, or a configuration error naming the variable.
    pub fn require_api_key(&self) -> Result<&ApiCredential, CoachError> {
        self.api_key.as_ref().ok_or_else(|| {
            CoachError::Config(format!(
                "OpenAI API key not set: configure '{}' environment variable",
                API_KEY_ENV
            ))
        })
    }

    /// Completion settings for the judge request.
    pub fn completion_config(&self) -> CompletionConfig {
        CompletionConfig {
            model: self.model.clone(),
            temperature: self.temperature,
            timeout: self.timeout,
            json_response: true,
        }
    }
}

/// Parse a timeout given as seconds (`30`, `12.5`) or a humantime string (`45s`).
pub fn parse_timeout(raw: &str) -> Result<Duration, CoachError> {
    let raw = raw.trim();

    if let Ok(secs) = raw.parse::<f64>() {
        if secs.is_finite() && secs > 0.0 {
            return Ok(Duration::from_secs_f64(secs));
        }
        return Err(CoachError::Config(format!(
            "{} must be a positive number of seconds, got '{}'",
            TIMEOUT_ENV, raw
        )));
    }

    match humantime::parse_duration(raw) {
        Ok(d) if !d.is_zero() => Ok(d),
        Ok(_) => Err(CoachError::Config(format!(
            "{} must be greater than zero",
            TIMEOUT_ENV
        ))),
        Err(e) => Err(CoachError::Config(format!(
            "invalid {} '{}': {}",
            TIMEOUT_ENV, raw, e
        ))),
    }
}
