//! LLM provider implementations for the Parley flow engine.
//!
//! The engine treats text generation as an injected capability: a single-shot
//! [`LLMProvider::complete`] call that turns a chat-style request into a
//! response. This crate holds the trait, an OpenAI-compatible HTTP
//! implementation, and a deterministic mock for tests.

pub mod mock;
pub mod openai_compatible;
pub mod traits;

pub use mock::MockProvider;
pub use openai_compatible::OpenAICompatibleProvider;
pub use traits::{
    CompletionRequest, CompletionResponse, LLMProvider, Message, ProviderError, ProviderResult,
};
