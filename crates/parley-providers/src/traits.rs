use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("API error: {0}")]
    ApiError(String),
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// One chat message in a completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    #[serde(default)]
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub content: String,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub model: String,
    pub provider: String,
    #[serde(default = "default_finish_reason")]
    pub finish_reason: String,
}

fn default_finish_reason() -> String {
    "stop".to_string()
}

/// Unified interface for LLM providers.
///
/// Implementations handle request translation, API communication, and
/// response normalization for a specific provider backend.
///
/// # Example
///
/// ```ignore
/// let provider: &dyn LLMProvider = &openai_provider;
/// let req = CompletionRequest {
///     model: "gpt-4".into(),
///     messages: vec![Message::user("Hello")],
///     temperature: None,
///     max_tokens: None,
/// };
/// let resp = provider.complete(req).await?;
/// println!("tokens used: {} + {}", resp.prompt_tokens, resp.completion_tokens);
/// ```
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Send a completion request and return the full response.
    async fn complete(&self, req: CompletionRequest) -> ProviderResult<CompletionResponse>;

    /// Provider name for diagnostics and routing (e.g. `"openai"`, `"mock"`).
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_constructors() {
        let m = Message::system("be brief");
        assert_eq!(m.role, "system");
        assert_eq!(m.content, "be brief");

        let m = Message::user("hi");
        assert_eq!(m.role, "user");

        let m = Message::assistant("hello");
        assert_eq!(m.role, "assistant");
    }

    #[test]
    fn test_response_finish_reason_default() {
        let resp: CompletionResponse = serde_json::from_str(
            r#"{"content":"x","prompt_tokens":1,"completion_tokens":2,"model":"m","provider":"p"}"#,
        )
        .unwrap();
        assert_eq!(resp.finish_reason, "stop");
    }
}
