//! OpenAI-compatible chat-completions provider.
//!
//! Works with any endpoint that speaks `POST {base_url}/chat/completions`
//! and supports `response_format: {"type": "json_object"}`.

use super::{
    secrets::ApiCredential, ChatMessage, CompletionConfig, CompletionResponse, LlmProvider,
    ProviderError, TokenUsage,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default API base URL.
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Error codes the service uses when a parameter is not accepted by a model.
const UNSUPPORTED_CODES: &[&str] = &["unsupported_parameter", "unsupported_value"];

/// OpenAI chat-completions provider.
pub struct OpenAiProvider {
    credential: ApiCredential,
    base_url: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("credential", &self.credential)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl OpenAiProvider {
    /// Create a new provider against the default base URL.
    pub fn new(credential: ApiCredential) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ProviderError::HttpError(e.to_string()))?;

        Ok(Self {
            credential,
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            client,
        })
    }

    /// Set custom base URL. A trailing slash is ignored.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Chat-completions request format.
#[derive(Debug, Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    type_: &'static str,
}

/// Chat-completions response format.
#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<OpenAiUsage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct OpenAiError {
    error: OpenAiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorDetail {
    #[serde(default)]
    message: String,
    #[serde(default)]
    param: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

/// Map a 400 error body onto an unsupported-parameter error when it is one.
fn classify_bad_request(detail: OpenAiErrorDetail) -> ProviderError {
    let code_unsupported = detail
        .code
        .as_deref()
        .map(|c| UNSUPPORTED_CODES.contains(&c))
        .unwrap_or(false);

    let param = detail.param.clone().or_else(|| {
        (code_unsupported && detail.message.contains("temperature"))
            .then(|| "temperature".to_string())
    });

    match param {
        Some(param) if code_unsupported || param == "temperature" => {
            ProviderError::UnsupportedParameter {
                param,
                message: detail.message,
            }
        }
        _ => ProviderError::ApiError {
            status: 400,
            message: detail.message,
        },
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        config: &CompletionConfig,
    ) -> Result<CompletionResponse, ProviderError> {
        let request = OpenAiRequest {
            model: &config.model,
            messages: &messages,
            response_format: config.json_response.then_some(ResponseFormat {
                type_: "json_object",
            }),
            temperature: config.temperature,
        };

        // SECURITY: Only expose the credential here, at the point of use
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(self.credential.expose())
            .timeout(config.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(config.timeout)
                } else {
                    ProviderError::HttpError(e.to_string())
                }
            })?;

        let status = response.status();

        if status == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_secs);
            return Err(ProviderError::RateLimited { retry_after });
        }

        if status == 401 || status == 403 {
            return Err(ProviderError::AuthError);
        }

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(match serde_json::from_str::<OpenAiError>(&text) {
                Ok(body) if status == 400 => classify_bad_request(body.error),
                Ok(body) => ProviderError::ApiError {
                    status: status.as_u16(),
                    message: body.error.message,
                },
                Err(_) => ProviderError::ApiError {
                    status: status.as_u16(),
                    message: text,
                },
            });
        }

        let body: OpenAiResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::Timeout(config.timeout)
            } else {
                ProviderError::ParseError(e.to_string())
            }
        })?;

        let (content, finish_reason) = body
            .choices
            .into_iter()
            .next()
            .map(|c| (c.message.content.unwrap_or_default(), c.finish_reason))
            .unwrap_or_default();

        Ok(CompletionResponse {
            content,
            usage: body.usage.map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
            }),
            model: body.model.unwrap_or_else(|| config.model.clone()),
            finish_reason,
        })
    }

    fn name(&self) -> &str {
        "openai"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::CredentialSource;

    fn detail(message: &str, param: Option<&str>, code: Option<&str>) -> OpenAiErrorDetail {
        OpenAiErrorDetail {
            message: message.to_string(),
            param: param.map(str::to_string),
            code: code.map(str::to_string),
        }
    }

    fn provider(key: &str) -> OpenAiProvider {
        OpenAiProvider::new(ApiCredential::new(
            key,
            CredentialSource::Programmatic,
            "OpenAI API key",
        ))
        .unwrap()
    }

    #[test]
    fn test_provider_creation() {
        let provider = provider("test-key");
        assert_eq!(provider.name(), "openai");
        assert_eq!(provider.base_url(), DEFAULT_OPENAI_BASE_URL);
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let provider = provider("test-key").with_base_url("http://localhost:9000/v1/");
        assert_eq!(provider.base_url(), "http://localhost:9000/v1");
    }

    #[test]
    fn test_api_key_not_in_debug_output() {
        let secret_key = "sk-super-secret-key-12345";
        let debug_output = format!("{:?}", provider(secret_key));

        assert!(
            !debug_output.contains(secret_key),
            "API key was exposed in Debug output!"
        );
        assert!(debug_output.contains("[REDACTED]"));
    }

    #[test]
    fn test_request_omits_temperature_when_none() {
        let messages = vec![ChatMessage::user("hi")];
        let request = OpenAiRequest {
            model: "o3-mini",
            messages: &messages,
            response_format: Some(ResponseFormat {
                type_: "json_object",
            }),
            temperature: None,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("temperature").is_none());
        assert_eq!(value["response_format"]["type"], "json_object");
    }

    #[test]
    fn test_classify_temperature_param() {
        let err = classify_bad_request(detail(
            "Unsupported value: 'temperature' does not support 0.2 with this model.",
            Some("temperature"),
            Some("unsupported_value"),
        ));
        assert!(err.is_unsupported_parameter("temperature"));
    }

    #[test]
    fn test_classify_code_without_param() {
        let err = classify_bad_request(detail(
            "temperature is not supported with this model",
            None,
            Some("unsupported_parameter"),
        ));
        assert!(err.is_unsupported_parameter("temperature"));
    }

    #[test]
    fn test_classify_plain_bad_request() {
        let err = classify_bad_request(detail("messages must not be empty", None, None));
        assert!(matches!(err, ProviderError::ApiError { status: 400, .. }));

        let err = classify_bad_request(detail(
            "Invalid type for 'messages'",
            Some("messages"),
            Some("invalid_type"),
        ));
        assert!(matches!(err, ProviderError::ApiError { status: 400, .. }));
    }
}
