//! Flow schema types — the contract between flow files and the engine.

use serde::{Deserialize, Serialize};

/// A named, loaded conversation script.
///
/// Immutable once loaded. Step ids are assumed unique within a flow; a
/// duplicate id makes "which step wins" undefined. This is a documented
/// risk, not a detected error — flows are validated only as far as
/// execution requires.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Flow {
    pub name: String,
    pub slug: String,
    /// Strategy for matching this flow's trigger utterances when a new
    /// conversation arrives. Only `basic` flows participate in trigger
    /// selection.
    #[serde(default)]
    pub classifier: ClassifierEngine,
    /// Trigger utterances for initial flow selection.
    #[serde(default)]
    pub utterances: Vec<String>,
    /// Optional classification prompt carried by the flow definition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    pub steps: Vec<FlowStep>,
}

impl Flow {
    /// Look up a step by id. First occurrence wins.
    pub fn step(&self, id: &str) -> Option<&FlowStep> {
        self.steps.iter().find(|s| s.id == id)
    }
}

/// A node in a flow: an ordered action list plus a default transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct FlowStep {
    pub id: String,
    #[serde(default)]
    pub actions: Vec<Action>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_step: Option<String>,
    /// Entry action (by kind name) within `next_step`, used when this step's
    /// action list is exhausted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_step_action_id: Option<String>,
}

/// One executable unit within a step.
///
/// A closed set: the engine matches on it exhaustively, so adding a kind is
/// a compile-checked change. Unrecognized names in flow files deserialize to
/// [`Action::Unknown`], which executes as a no-op.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "name", content = "params", rename_all = "kebab-case")]
pub enum Action {
    SendMessage(SendMessageParams),
    Listen,
    Classify(ClassifyParams),
    SetContext(SetContextParams),
    NoOp,
    #[serde(other)]
    Unknown,
}

impl Action {
    /// The wire name of this action kind. Branch jumps and
    /// `next_step_action_id` resolve action names against this.
    pub fn kind(&self) -> &'static str {
        match self {
            Action::SendMessage(_) => "send-message",
            Action::Listen => "listen",
            Action::Classify(_) => "classify",
            Action::SetContext(_) => "set-context",
            Action::NoOp => "no-op",
            Action::Unknown => "unknown",
        }
    }
}

/// Parameters for `send-message`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SendMessageParams {
    #[serde(default)]
    pub engine: SendMessageEngine,
    /// Static template content (`text` engine).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Prompt template (`ai` engine).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SendMessageEngine {
    #[default]
    Text,
    Ai,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierEngine {
    #[default]
    Basic,
    Ai,
}

/// Parameters for `classify`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ClassifyParams {
    #[serde(default)]
    pub engine: ClassifierEngine,
    /// Caller-supplied prompt sent verbatim instead of the generated one
    /// (`ai` engine only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(default)]
    pub branches: Vec<Branch>,
}

/// One candidate destination inside a `classify` action.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Branch {
    pub name: String,
    #[serde(default)]
    pub utterances: Vec<String>,
    #[serde(default)]
    pub jump: Jump,
    /// Fallback branch taken when nothing matches. If several branches are
    /// marked, the first in definition order wins.
    #[serde(default)]
    pub default: bool,
}

/// Where a branch redirects the execution pointer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Jump {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_id: Option<String>,
    /// Action kind name, resolved within the *current* step's action list —
    /// not the destination step.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_id: Option<String>,
}

/// Parameters for `set-context`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SetContextParams {
    pub key: String,
    /// Template expression rendered against the session before storing.
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_kinds() {
        assert_eq!(Action::SendMessage(SendMessageParams::default()).kind(), "send-message");
        assert_eq!(Action::Listen.kind(), "listen");
        assert_eq!(Action::NoOp.kind(), "no-op");
    }

    #[test]
    fn test_action_deserializes_from_yaml() {
        let action: Action = serde_yaml::from_str(
            "name: send-message\nparams:\n  content: \"hi {{context.name}}\"\n",
        )
        .unwrap();
        match action {
            Action::SendMessage(params) => {
                assert_eq!(params.engine, SendMessageEngine::Text);
                assert_eq!(params.content.as_deref(), Some("hi {{context.name}}"));
            }
            other => panic!("expected send-message, got {other:?}"),
        }
    }

    #[test]
    fn test_unrecognized_action_name_is_unknown() {
        let action: Action = serde_yaml::from_str("name: frobnicate\n").unwrap();
        assert!(matches!(action, Action::Unknown));
    }

    #[test]
    fn test_flow_step_lookup_first_wins() {
        let flow: Flow = serde_yaml::from_str(
            r#"
name: Dup
slug: dup
steps:
  - id: a
    actions:
      - name: listen
  - id: a
    actions:
      - name: no-op
"#,
        )
        .unwrap();
        let step = flow.step("a").unwrap();
        assert!(matches!(step.actions[0], Action::Listen));
    }

    #[test]
    fn test_classify_params_from_yaml() {
        let params: ClassifyParams = serde_yaml::from_str(
            r#"
engine: basic
branches:
  - name: shipping
    utterances: [shipping, deliver]
    jump:
      step_id: shipping
  - name: fallback
    default: true
    jump:
      step_id: fallback
"#,
        )
        .unwrap();
        assert_eq!(params.engine, ClassifierEngine::Basic);
        assert_eq!(params.branches.len(), 2);
        assert!(params.branches[1].default);
        assert_eq!(params.branches[0].jump.step_id.as_deref(), Some("shipping"));
        assert!(params.branches[0].jump.action_id.is_none());
    }
}
