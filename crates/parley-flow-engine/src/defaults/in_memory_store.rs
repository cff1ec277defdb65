//! In-memory session store.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::errors::SessionStoreError;
use crate::traits::SessionStore;
use crate::types::Session;

struct Entry {
    session: Session,
    expires_at: Option<Instant>,
}

/// Session store backed by a `HashMap` behind an async `RwLock`.
///
/// Expired entries are dropped lazily on read. Suitable for tests and
/// single-process deployments.
pub struct InMemorySessionStore {
    entries: RwLock<HashMap<String, Entry>>,
}

impl InMemorySessionStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, key: &str) -> Result<Option<Session>, SessionStoreError> {
        {
            let guard = self.entries.read().await;
            match guard.get(key) {
                None => return Ok(None),
                Some(entry) => match entry.expires_at {
                    Some(at) if Instant::now() >= at => {}
                    _ => return Ok(Some(entry.session.clone())),
                },
            }
        }
        self.entries.write().await.remove(key);
        Ok(None)
    }

    async fn set(
        &self,
        key: &str,
        session: &Session,
        ttl: Option<Duration>,
    ) -> Result<(), SessionStoreError> {
        let entry = Entry {
            session: session.clone(),
            expires_at: ttl.map(|ttl| Instant::now() + ttl),
        };
        self.entries.write().await.insert(key.to_string(), entry);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), SessionStoreError> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn clear(&self) -> Result<(), SessionStoreError> {
        self.entries.write().await.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Action, ClassifierEngine, Flow, FlowStep};
    use chrono::Utc;

    fn sample_session(conversation_id: &str) -> Session {
        Session {
            conversation_id: conversation_id.to_string(),
            adapter_name: "console".to_string(),
            flow: Flow {
                name: "Sample".to_string(),
                slug: "sample".to_string(),
                classifier: ClassifierEngine::Basic,
                utterances: vec!["hi".to_string()],
                prompt: None,
                steps: vec![FlowStep {
                    id: "start".to_string(),
                    actions: vec![Action::Listen],
                    next_step: None,
                    next_step_action_id: None,
                }],
            },
            current_step_id: "start".to_string(),
            current_step_action_index: 0,
            context: Default::default(),
            waiting_for_input: false,
            output_messages: Vec::new(),
            executed_steps: Vec::new(),
            last_input: None,
            started_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_set_get() {
        let store = InMemorySessionStore::new();
        store
            .set("user-state:c1", &sample_session("c1"), None)
            .await
            .unwrap();
        let session = store.get("user-state:c1").await.unwrap().unwrap();
        assert_eq!(session.conversation_id, "c1");
    }

    #[tokio::test]
    async fn test_get_missing() {
        let store = InMemorySessionStore::new();
        assert!(store.get("user-state:none").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete() {
        let store = InMemorySessionStore::new();
        store
            .set("user-state:c1", &sample_session("c1"), None)
            .await
            .unwrap();
        store.delete("user-state:c1").await.unwrap();
        assert!(store.get("user-state:c1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_ttl_expiry() {
        let store = InMemorySessionStore::new();
        store
            .set(
                "user-state:c1",
                &sample_session("c1"),
                Some(Duration::from_millis(10)),
            )
            .await
            .unwrap();
        assert!(store.get("user-state:c1").await.unwrap().is_some());

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(store.get("user-state:c1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_clear() {
        let store = InMemorySessionStore::new();
        store
            .set("user-state:c1", &sample_session("c1"), None)
            .await
            .unwrap();
        store
            .set("user-state:c2", &sample_session("c2"), None)
            .await
            .unwrap();
        store.clear().await.unwrap();
        assert!(store.get("user-state:c1").await.unwrap().is_none());
        assert!(store.get("user-state:c2").await.unwrap().is_none());
    }
}
