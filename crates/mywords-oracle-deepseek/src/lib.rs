// # DeepSeek Text Oracle
//
// This crate provides the text oracle used for word lookups and stories.
//
// ## Protocol
//
// OpenAI-compatible chat completions:
//
// ```http
// POST /v1/chat/completions
// Authorization: Bearer <key>
//
// {"model": "deepseek-chat",
//  "messages": [{"role": "system", ...}, {"role": "user", ...}],
//  "temperature": 0.3, "max_tokens": 1000}
// ```
//
// The first choice's message content is returned trimmed. Whatever shape
// that text has is the caller's problem; this crate never parses it.

use mywords_core::ProviderRegistry;
use mywords_core::config::OracleConfig;
use mywords_core::traits::{CompletionRequest, TextOracle, TextOracleFactory};
use mywords_core::{Error, Result};

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Generation can be slow; allow a full minute
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(60);

const SERVICE: &str = "deepseek";

/// DeepSeek chat-completions oracle
///
/// The Debug implementation intentionally does NOT expose the API key.
pub struct DeepSeekOracle {
    api_url: String,
    model: String,
    /// ⚠️ NEVER log this value
    api_key: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for DeepSeekOracle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeepSeekOracle")
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("api_key", &"<REDACTED>")
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl DeepSeekOracle {
    /// Create a new oracle
    ///
    /// # Parameters
    ///
    /// - `api_key`: DeepSeek API key
    /// - `api_url`: Chat completions endpoint
    /// - `model`: Model name, e.g. "deepseek-chat"
    pub fn new(
        api_key: impl Into<String>,
        api_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(Error::config("DeepSeek API key is required"));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_url: api_url.into(),
            model: model.into(),
            api_key,
            client,
        })
    }

    fn body<'a>(&'a self, request: &'a CompletionRequest) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user,
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        }
    }
}

/// Map a non-success status to a backend error
fn map_status(status: u16, body: &str) -> Error {
    let detail = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.trim().to_string());

    match status {
        401 | 403 => Error::backend(SERVICE, format!("authentication failed: {}", detail)),
        429 => Error::backend(SERVICE, "rate limit exceeded, please retry later"),
        500..=599 => Error::backend(SERVICE, format!("server error (transient) {}: {}", status, detail)),
        _ => Error::backend(SERVICE, format!("request failed: {}: {}", status, detail)),
    }
}

/// Extract the first choice's content, trimmed and non-empty
fn first_content(response: ChatResponse) -> Result<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .ok_or_else(|| Error::backend(SERVICE, "response contained no content"))
}

#[async_trait::async_trait]
impl TextOracle for DeepSeekOracle {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        tracing::debug!(
            model = %self.model,
            temperature = request.temperature,
            max_tokens = request.max_tokens,
            "Requesting completion"
        );

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&self.body(request))
            .send()
            .await
            .map_err(|e| Error::backend(SERVICE, format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(map_status(status.as_u16(), &body));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::backend(SERVICE, format!("Failed to parse response: {}", e)))?;

        first_content(parsed)
    }

    fn oracle_name(&self) -> &'static str {
        "deepseek"
    }
}

/// Factory for creating DeepSeek oracles
pub struct DeepSeekFactory;

impl TextOracleFactory for DeepSeekFactory {
    fn create(&self, config: &OracleConfig) -> Result<Arc<dyn TextOracle>> {
        match config {
            OracleConfig::DeepSeek {
                api_key,
                api_url,
                model,
            } => Ok(Arc::new(DeepSeekOracle::new(
                api_key.as_str(),
                api_url.as_str(),
                model.as_str(),
            )?)),
            _ => Err(Error::config("Invalid config for DeepSeek oracle")),
        }
    }
}

/// Register the DeepSeek oracle with a registry
pub fn register(registry: &ProviderRegistry) {
    registry.register_oracle("deepseek", Box::new(DeepSeekFactory));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CompletionRequest {
        CompletionRequest {
            system: "You are a dictionary.".to_string(),
            user: "cat".to_string(),
            temperature: 0.3,
            max_tokens: 1000,
        }
    }

    #[test]
    fn test_factory_creation() {
        let config = OracleConfig::deepseek("sk-test");
        assert!(DeepSeekFactory.create(&config).is_ok());
        assert!(DeepSeekFactory.create(&OracleConfig::deepseek("")).is_err());
    }

    #[test]
    fn test_request_body_shape() {
        let oracle = DeepSeekOracle::new("sk-test", "https://api.deepseek.com/v1/chat/completions", "deepseek-chat").unwrap();
        let req = request();
        let json = serde_json::to_value(oracle.body(&req)).unwrap();

        assert_eq!(json["model"], "deepseek-chat");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "cat");
        assert_eq!(json["max_tokens"], 1000);
    }

    #[test]
    fn test_first_content_trims_and_rejects_empty() {
        let ok: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"index":0,"message":{"role":"assistant","content":"  {\"word\":\"cat\"}\n"}}]}"#,
        )
        .unwrap();
        assert_eq!(first_content(ok).unwrap(), r#"{"word":"cat"}"#);

        let blank: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":"   "}}]}"#).unwrap();
        assert!(first_content(blank).is_err());

        let none: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(first_content(none).is_err());
    }

    #[test]
    fn test_status_mapping_uses_provider_message() {
        let err = map_status(402, r#"{"error":{"message":"Insufficient Balance","type":"unknown_error"}}"#);
        assert!(err.to_string().contains("Insufficient Balance"));
        assert!(err.is_retryable());
        assert!(map_status(503, "").is_retryable());
    }

    #[test]
    fn test_api_key_not_exposed_in_debug() {
        let oracle = DeepSeekOracle::new("sk-very-secret", "https://x", "m").unwrap();
        assert!(!format!("{:?}", oracle).contains("sk-very-secret"));
    }

    #[test]
    fn test_register() {
        let registry = ProviderRegistry::new();
        register(&registry);
        assert!(registry.has_oracle("deepseek"));
        assert!(registry.create_oracle(&OracleConfig::deepseek("sk-test")).is_ok());
    }
}
