//! The judge boundary.
//!
//! A [`Judge`] takes the system instruction and the user's prompt and returns
//! a [`Judgment`] plus token usage. [`ProviderJudge`] implements it on top of
//! any [`LlmProvider`] with two fixed policies:
//!
//! 1. **Temperature shim**: if the service rejects `temperature` as
//!    unsupported, the request is sent once more without it. No other error
//!    is retried.
//! 2. **Soft parse**: completion content that is not JSON, or does not match
//!    the judgment schema, becomes a fallback judgment carrying the original
//!    prompt and a diagnostic note. This applies to content parsing only.

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::sync::{Arc, OnceLock};

use promptcoach_core::{Judgment, ModelUsage};

use crate::providers::{ChatMessage, CompletionConfig, LlmProvider, ProviderError};

/// Note attached when the judge returned something that is not JSON.
pub const NON_JSON_NOTE: &str = "non-json model output";

/// Prefix of the note attached when the JSON does not match the schema.
pub const MALFORMED_NOTE_PREFIX: &str = "malformed model output";

/// Parameter dropped on the compatibility retry.
const TEMPERATURE_PARAM: &str = "temperature";

/// Embedded judgment schema.
const JUDGMENT_SCHEMA_JSON: &str = include_str!("../schema/judgment.schema.json");

static COMPILED_SCHEMA: OnceLock<Result<jsonschema::Validator, String>> = OnceLock::new();

/// What a judge call produced.
#[derive(Debug, Clone, PartialEq)]
pub struct JudgeOutcome {
    pub judgment: Judgment,
    pub usage: ModelUsage,
}

/// External judge that scores and rewrites a prompt.
#[async_trait]
pub trait Judge: Send + Sync {
    /// Judge `prompt` under `system_instruction`.
    ///
    /// Service failures are returned as errors. Unusable content is not an
    /// error; it yields a fallback judgment.
    async fn judge(
        &self,
        system_instruction: &str,
        prompt: &str,
    ) -> Result<JudgeOutcome, ProviderError>;

    /// Judge name for logs.
    fn name(&self) -> &str;
}

/// Judge backed by an LLM provider.
pub struct ProviderJudge {
    provider: Arc<dyn LlmProvider>,
    config: CompletionConfig,
}

impl ProviderJudge {
    pub fn new(provider: Arc<dyn LlmProvider>, config: CompletionConfig) -> Self {
        Self { provider, config }
    }
}

#[async_trait]
impl Judge for ProviderJudge {
    async fn judge(
        &self,
        system_instruction: &str,
        prompt: &str,
    ) -> Result<JudgeOutcome, ProviderError> {
        let messages = vec![
            ChatMessage::system(system_instruction),
            ChatMessage::user(prompt),
        ];

        let first = self.provider.complete(messages.clone(), &self.config).await;

        let response = match first {
            Ok(response) => response,
            Err(e)
                if self.config.temperature.is_some()
                    && e.is_unsupported_parameter(TEMPERATURE_PARAM) =>
            {
                tracing::warn!(
                    provider = self.provider.name(),
                    model = %self.config.model,
                    error = %e,
                    "temperature rejected, retrying without it"
                );
                let retry_config = CompletionConfig {
                    temperature: None,
                    ..self.config.clone()
                };
                self.provider.complete(messages, &retry_config).await?
            }
            Err(e) => return Err(e),
        };

        if response.is_truncated() {
            tracing::warn!(
                model = %response.model,
                "judge output hit the token limit; parsing may fall back"
            );
        }

        let usage = match response.usage {
            Some(u) => ModelUsage::new(&response.model, u.prompt_tokens, u.completion_tokens),
            None => ModelUsage {
                model: response.model.clone(),
                ..Default::default()
            },
        };

        Ok(JudgeOutcome {
            judgment: parse_judgment(&response.content, prompt),
            usage,
        })
    }

    fn name(&self) -> &str {
        self.provider.name()
    }
}

fn get_validator() -> Result<&'static jsonschema::Validator, String> {
    let result = COMPILED_SCHEMA.get_or_init(|| {
        let schema_value: JsonValue = serde_json::from_str(JUDGMENT_SCHEMA_JSON)
            .map_err(|e| format!("Invalid schema JSON: {}", e))?;

        jsonschema::options()
            .build(&schema_value)
            .map_err(|e| format!("Failed to compile schema: {}", e))
    });

    result.as_ref().map_err(|e| e.clone())
}

/// Parse judge content into a judgment, substituting a fallback on failure.
///
/// `original` is the prompt that was judged; fallbacks carry it as `improved`.
pub fn parse_judgment(content: &str, original: &str) -> Judgment {
    let value: JsonValue = match serde_json::from_str(content) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(error = %e, "judge returned non-JSON content");
            return Judgment::fallback(original, NON_JSON_NOTE);
        }
    };

    match get_validator() {
        Ok(validator) => {
            if let Some(error) = validator.iter_errors(&value).next() {
                let reason = format!("{} at {}", error, error.instance_path);
                tracing::warn!(reason = %reason, "judge content failed schema");
                return Judgment::fallback(original, format!("{}: {}", MALFORMED_NOTE_PREFIX, reason));
            }
        }
        Err(e) => tracing::warn!(error = %e, "judgment schema unavailable"),
    }

    match serde_json::from_value::<Judgment>(value) {
        Ok(judgment) => judgment,
        Err(e) => {
            tracing::warn!(error = %e, "judge content did not deserialize");
            Judgment::fallback(original, format!("{}: {}", MALFORMED_NOTE_PREFIX, e))
        }
    }
}
