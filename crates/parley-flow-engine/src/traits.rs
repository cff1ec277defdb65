//! Capability contracts consumed by the engine.
//!
//! Every pluggable component is an async trait. Default implementations
//! live in [`defaults`](crate::defaults).

use std::time::Duration;

use async_trait::async_trait;

use crate::errors::{AdapterError, SessionStoreError};
use crate::types::Session;

/// Storage key for a conversation's session state.
pub fn session_key(conversation_id: &str) -> String {
    format!("user-state:{conversation_id}")
}

/// Keyed persistence for session state, one record per conversation.
///
/// No compare-and-swap or locking primitive is assumed; the engine
/// serializes turns per conversation itself.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Session>, SessionStoreError>;

    /// Store a session. `ttl` bounds how long the record may live; `None`
    /// keeps it until deleted.
    async fn set(
        &self,
        key: &str,
        session: &Session,
        ttl: Option<Duration>,
    ) -> Result<(), SessionStoreError>;

    async fn delete(&self, key: &str) -> Result<(), SessionStoreError>;

    /// Drop every stored session.
    async fn clear(&self) -> Result<(), SessionStoreError>;
}

/// Outbound message transport, one per channel, selected by name at
/// dispatch time.
#[async_trait]
pub trait ChatAdapter: Send + Sync {
    /// Registry name, e.g. `"console"` or `"socket"`.
    fn name(&self) -> &str;

    async fn send_message(
        &self,
        conversation_id: &str,
        message: &str,
    ) -> Result<(), AdapterError>;
}
