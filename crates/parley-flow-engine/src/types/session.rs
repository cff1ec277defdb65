//! Per-conversation execution state.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::flow::{Flow, FlowStep};

/// The persisted execution cursor for one conversation.
///
/// At most one session exists per conversation id at any time; its absence
/// means "no active flow." The engine deletes the session exactly when the
/// flow runs out of steps, never partially.
///
/// **Invariant**: `context` uses `BTreeMap`, never `HashMap` — stores
/// persist sessions as JSON and key ordering must be deterministic.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Session {
    pub conversation_id: String,
    pub adapter_name: String,
    /// Snapshot of the flow taken at session creation. Later changes to the
    /// loaded flow set do not affect in-flight sessions.
    pub flow: Flow,
    pub current_step_id: String,
    pub current_step_action_index: usize,
    #[serde(default)]
    pub context: BTreeMap<String, Value>,
    pub waiting_for_input: bool,
    /// Messages produced since the session was last returned to the caller.
    /// Cleared whenever a turn suspends or ends — not a transcript.
    #[serde(default)]
    pub output_messages: Vec<String>,
    /// Ordered audit of entered steps.
    #[serde(default)]
    pub executed_steps: Vec<FlowStep>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_input: Option<String>,
    pub started_at: DateTime<Utc>,
}

impl Session {
    /// JSON view of this session, used by the template renderer.
    pub fn as_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// What one call to `handle_input` produced.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct TurnResult {
    pub executed_steps: Vec<FlowStep>,
    pub output_messages: Vec<String>,
    pub waiting_for_input: bool,
    pub flow_ended: bool,
}
