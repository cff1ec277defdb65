//! File-backed session store.
//!
//! One JSON document per key under the base directory. Writes use a
//! temp-file-then-rename pattern so a crash cannot leave a partial record.
//! TTL is recorded as an expiry timestamp inside the envelope and checked
//! on read.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::SessionStoreError;
use crate::traits::SessionStore;
use crate::types::Session;

#[derive(Serialize, Deserialize)]
struct Envelope {
    session: Session,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expires_at: Option<DateTime<Utc>>,
}

/// Session store persisting each record as a JSON file.
pub struct FileSessionStore {
    dir: PathBuf,
}

impl FileSessionStore {
    /// Create a store rooted at `dir`, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, SessionStoreError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| SessionStoreError::Store {
            message: format!("failed to create session directory: {e}"),
        })?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{safe}.json"))
    }
}

/// Atomic write: serialize to a temp file, then rename over the target.
fn atomic_write(path: &Path, data: &[u8]) -> Result<(), SessionStoreError> {
    let temp_path = path.with_extension("json.tmp");
    std::fs::write(&temp_path, data).map_err(|e| SessionStoreError::Store {
        message: format!("failed to write temp file: {e}"),
    })?;
    std::fs::rename(&temp_path, path).map_err(|e| SessionStoreError::Store {
        message: format!("failed to rename temp file: {e}"),
    })?;
    Ok(())
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn get(&self, key: &str) -> Result<Option<Session>, SessionStoreError> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let data = std::fs::read(&path).map_err(|e| SessionStoreError::Store {
            message: format!("failed to read session file: {e}"),
        })?;
        let envelope: Envelope =
            serde_json::from_slice(&data).map_err(|e| SessionStoreError::Deserialize {
                message: e.to_string(),
            })?;

        if let Some(expires_at) = envelope.expires_at {
            if Utc::now() >= expires_at {
                let _ = std::fs::remove_file(&path);
                return Ok(None);
            }
        }
        Ok(Some(envelope.session))
    }

    async fn set(
        &self,
        key: &str,
        session: &Session,
        ttl: Option<Duration>,
    ) -> Result<(), SessionStoreError> {
        let envelope = Envelope {
            session: session.clone(),
            expires_at: ttl.map(|ttl| Utc::now() + ttl),
        };
        let data =
            serde_json::to_vec_pretty(&envelope).map_err(|e| SessionStoreError::Serialize {
                message: e.to_string(),
            })?;
        atomic_write(&self.path_for(key), &data)
    }

    async fn delete(&self, key: &str) -> Result<(), SessionStoreError> {
        let path = self.path_for(key);
        if path.exists() {
            std::fs::remove_file(&path).map_err(|e| SessionStoreError::Store {
                message: format!("failed to delete session file: {e}"),
            })?;
        }
        Ok(())
    }

    async fn clear(&self) -> Result<(), SessionStoreError> {
        let entries = std::fs::read_dir(&self.dir).map_err(|e| SessionStoreError::Store {
            message: format!("failed to read session directory: {e}"),
        })?;
        for entry in entries {
            let entry = entry.map_err(|e| SessionStoreError::Store {
                message: format!("failed to read directory entry: {e}"),
            })?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("json") {
                std::fs::remove_file(&path).map_err(|e| SessionStoreError::Store {
                    message: format!("failed to delete session file: {e}"),
                })?;
            }
        }
        Ok(())
    }
}
