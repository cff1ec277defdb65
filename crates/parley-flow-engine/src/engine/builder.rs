//! Builder for [`FlowMachine`](super::FlowMachine).

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};

use parley_providers::LLMProvider;

use crate::defaults::InMemorySessionStore;
use crate::traits::SessionStore;

use super::FlowMachine;

/// Default bound on step/action transitions within a single turn.
pub const DEFAULT_MAX_TRANSITIONS: usize = 64;

/// Assembles a [`FlowMachine`] from injected capabilities.
///
/// Defaults: in-memory session store, no LLM provider, no session TTL,
/// transition cap of [`DEFAULT_MAX_TRANSITIONS`].
pub struct FlowMachineBuilder {
    store: Option<Arc<dyn SessionStore>>,
    provider: Option<Arc<dyn LLMProvider>>,
    model: String,
    system_prompt: String,
    session_ttl: Option<Duration>,
    max_transitions: usize,
}

impl FlowMachineBuilder {
    pub(super) fn new() -> Self {
        Self {
            store: None,
            provider: None,
            model: "gpt-3.5-turbo".to_string(),
            system_prompt: String::new(),
            session_ttl: None,
            max_transitions: DEFAULT_MAX_TRANSITIONS,
        }
    }

    /// Session store backing all conversation state.
    pub fn store(mut self, store: impl SessionStore + 'static) -> Self {
        self.store = Some(Arc::new(store));
        self
    }

    /// Session store shared with the caller (e.g. for inspection in tests).
    pub fn shared_store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// LLM provider used by AI-mode send-message and classify actions.
    pub fn provider(mut self, provider: impl LLMProvider + 'static) -> Self {
        self.provider = Some(Arc::new(provider));
        self
    }

    /// LLM provider shared with the caller.
    pub fn shared_provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Model name passed to the provider.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// System prompt prepended to AI-generated messages.
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// TTL applied to every session write. `None` (the default) keeps
    /// sessions until the flow ends.
    pub fn session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = Some(ttl);
        self
    }

    /// Bound on step/action transitions within one turn — the cycle guard
    /// for flows with no `listen` and no terminal step.
    pub fn max_transitions(mut self, limit: usize) -> Self {
        self.max_transitions = limit;
        self
    }

    pub fn build(self) -> FlowMachine {
        FlowMachine {
            flows: RwLock::new(Vec::new()),
            adapters: RwLock::new(HashMap::new()),
            store: self
                .store
                .unwrap_or_else(|| Arc::new(InMemorySessionStore::new())),
            provider: self.provider,
            model: self.model,
            system_prompt: RwLock::new(self.system_prompt),
            session_ttl: self.session_ttl,
            max_transitions: self.max_transitions,
            turn_locks: Mutex::new(HashMap::new()),
        }
    }
}
