use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::traits::*;

/// Provider for any OpenAI-compatible chat-completions API (OpenAI itself,
/// Azure OpenAI, vLLM, LM Studio, ...).
#[derive(Debug, Clone)]
pub struct OpenAICompatibleProvider {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    api_key_header: String,
    api_key_format: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
    model: String,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: u64,
    completion_tokens: u64,
}

impl OpenAICompatibleProvider {
    /// Create a new OpenAICompatibleProvider.
    ///
    /// # Arguments
    /// * `base_url` - Base URL for the OpenAI-compatible API (required)
    /// * `api_key` - Optional API key
    /// * `api_key_header` - Header name for the API key (default: "Authorization")
    /// * `api_key_format` - Format string for the API key (default: "Bearer {key}",
    ///   use {key} as placeholder)
    pub fn new(
        base_url: String,
        api_key: Option<String>,
        api_key_header: Option<String>,
        api_key_format: Option<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            api_key_header: api_key_header.unwrap_or_else(|| "Authorization".to_string()),
            api_key_format: api_key_format.unwrap_or_else(|| "Bearer {key}".to_string()),
        }
    }

    fn get_api_url(&self) -> String {
        // Handle cases where base_url already includes the path
        if self.base_url.contains("/v1/chat/completions") {
            self.base_url.clone()
        } else if self.base_url.ends_with("/v1") {
            format!("{}/chat/completions", self.base_url)
        } else {
            format!("{}/v1/chat/completions", self.base_url)
        }
    }

    fn format_api_key(&self) -> Option<String> {
        self.api_key
            .as_ref()
            .map(|key| self.api_key_format.replace("{key}", key))
    }
}

#[async_trait]
impl LLMProvider for OpenAICompatibleProvider {
    async fn complete(&self, req: CompletionRequest) -> ProviderResult<CompletionResponse> {
        let chat_req = ChatRequest {
            model: &req.model,
            messages: &req.messages,
            temperature: req.temperature,
            max_tokens: req.max_tokens,
        };

        let mut request = self
            .client
            .post(self.get_api_url())
            .header("Content-Type", "application/json")
            .json(&chat_req);

        if let Some(auth_value) = self.format_api_key() {
            request = request.header(&self.api_key_header, auth_value);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError(error_text));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        tracing::debug!(
            provider = "openai-compatible",
            model = %chat_response.model,
            "completion received"
        );

        let first = chat_response.choices.first();
        Ok(CompletionResponse {
            content: first.map(|c| c.message.content.clone()).unwrap_or_default(),
            prompt_tokens: chat_response
                .usage
                .as_ref()
                .map(|u| u.prompt_tokens)
                .unwrap_or(0),
            completion_tokens: chat_response
                .usage
                .as_ref()
                .map(|u| u.completion_tokens)
                .unwrap_or(0),
            model: chat_response.model,
            provider: "openai-compatible".to_string(),
            finish_reason: first
                .and_then(|c| c.finish_reason.clone())
                .unwrap_or_else(|| "stop".to_string()),
        })
    }

    fn name(&self) -> &str {
        "openai-compatible"
    }
}
