use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::traits::*;

/// MockProvider returns instant in-memory responses without any external
/// HTTP calls.
///
/// Responses can be scripted in order (falling back to a fixed default once
/// the script runs out), and every request is recorded for later inspection.
/// This makes deterministic tests of classification and generation paths
/// possible without a network.
pub struct MockProvider {
    name: String,
    default_response: String,
    scripted: Mutex<VecDeque<String>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl MockProvider {
    /// Create a provider that answers every request with `default_response`.
    pub fn new(default_response: impl Into<String>) -> Self {
        Self {
            name: "mock".to_string(),
            default_response: default_response.into(),
            scripted: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Create a provider that plays back `responses` in order, then falls
    /// back to the empty string.
    pub fn with_responses<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let provider = Self::new("");
        {
            let mut scripted = provider.scripted.lock();
            scripted.extend(responses.into_iter().map(Into::into));
        }
        provider
    }

    /// Queue one more scripted response.
    pub fn push_response(&self, response: impl Into<String>) {
        self.scripted.lock().push_back(response.into());
    }

    /// All requests received so far, in order.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl LLMProvider for MockProvider {
    async fn complete(&self, req: CompletionRequest) -> ProviderResult<CompletionResponse> {
        self.requests.lock().push(req.clone());

        let content = self
            .scripted
            .lock()
            .pop_front()
            .unwrap_or_else(|| self.default_response.clone());

        // Token estimate: ~4 characters per token.
        let total_chars: usize = req.messages.iter().map(|m| m.content.len()).sum();
        let prompt_tokens = (total_chars / 4).max(1) as u64;
        let completion_tokens = (content.len() / 4).max(1) as u64;

        Ok(CompletionResponse {
            content,
            prompt_tokens,
            completion_tokens,
            model: req.model,
            provider: self.name.clone(),
            finish_reason: "stop".to_string(),
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}
