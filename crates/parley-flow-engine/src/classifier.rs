//! Branch classification for `classify` actions.
//!
//! Two strategies share one branch/jump shape. Keyword matching scans branch
//! utterances for case-insensitive substrings of the turn input; intent
//! matching asks the LLM provider to pick a branch and parses its structured
//! verdict. When neither produces a match, the default branch is taken; a
//! branch set with no default is fatal for the turn.

use serde::Deserialize;

use parley_providers::{CompletionRequest, Message};

use crate::engine::error::EngineError;
use crate::engine::TurnCtx;
use crate::types::{Branch, ClassifierEngine, ClassifyParams, FlowStep};

/// A handler-requested redirection of the next step and/or action pointer.
#[derive(Debug, Clone, Default)]
pub struct RouteOverride {
    pub next_step_id: Option<String>,
    pub next_action_index: Option<usize>,
}

/// Response shape expected from the intent-matching provider call.
///
/// The confidence score is informational only and never thresholded.
#[derive(Debug, Deserialize)]
struct IntentVerdict {
    #[serde(rename = "matchedBranch")]
    matched_branch: Option<String>,
    #[serde(rename = "confidenceScore", default)]
    confidence_score: f64,
}

/// Run the classify action: pick a branch, fall back to the default, and
/// resolve its jump into a routing override.
pub(crate) async fn classify(
    params: &ClassifyParams,
    step: &FlowStep,
    input: &str,
    ctx: &TurnCtx<'_>,
) -> Result<RouteOverride, EngineError> {
    let matched = match params.engine {
        ClassifierEngine::Basic => keyword_match(&params.branches, input),
        ClassifierEngine::Ai => intent_match(params, input, ctx).await?,
    };

    let branch = match matched {
        Some(branch) => branch,
        None => default_branch(&params.branches).ok_or_else(|| EngineError::NoFallbackBranch {
            step_id: step.id.clone(),
        })?,
    };

    tracing::debug!(branch = %branch.name, step = %step.id, "classified branch");
    Ok(resolve_jump(branch, step))
}

/// First branch (in definition order) with a case-insensitive substring
/// match over the input. The default branch never matches directly.
fn keyword_match<'a>(branches: &'a [Branch], input: &str) -> Option<&'a Branch> {
    let input = input.to_lowercase();
    branches
        .iter()
        .filter(|branch| !branch.default)
        .find(|branch| {
            branch
                .utterances
                .iter()
                .any(|utterance| input.contains(&utterance.to_lowercase()))
        })
}

fn default_branch(branches: &[Branch]) -> Option<&Branch> {
    branches.iter().find(|branch| branch.default)
}

async fn intent_match<'a>(
    params: &'a ClassifyParams,
    input: &str,
    ctx: &TurnCtx<'_>,
) -> Result<Option<&'a Branch>, EngineError> {
    let provider = ctx.provider()?;
    let prompt = match &params.prompt {
        Some(prompt) => prompt.clone(),
        None => build_intent_prompt(&params.branches, input),
    };

    let request = CompletionRequest {
        model: ctx.model.to_string(),
        messages: vec![Message::user(prompt)],
        temperature: Some(0.0),
        max_tokens: Some(64),
    };
    let response = provider.complete(request).await?;

    let verdict: IntentVerdict = serde_json::from_str(response.content.trim()).map_err(|e| {
        EngineError::MalformedProviderResponse {
            message: format!("intent verdict is not valid JSON: {e}"),
        }
    })?;

    let Some(name) = verdict.matched_branch else {
        return Ok(None);
    };

    let branch = params.branches.iter().find(|b| b.name == name);
    match branch {
        Some(_) => {
            tracing::debug!(branch = %name, confidence = verdict.confidence_score, "intent match")
        }
        None => tracing::warn!(branch = %name, "classifier picked a branch that is not defined"),
    }
    Ok(branch)
}

/// Prompt enumerating every non-default branch and its utterances.
fn build_intent_prompt(branches: &[Branch], input: &str) -> String {
    use std::fmt::Write;

    let mut intents = String::new();
    for (i, branch) in branches.iter().filter(|b| !b.default).enumerate() {
        let _ = writeln!(intents, "{}. **{}**", i + 1, branch.name);
        for utterance in &branch.utterances {
            let _ = writeln!(intents, "   - {utterance}");
        }
    }

    format!(
        "You are an assistant that classifies user messages into predefined intents.\n\n\
         ### Intents and Utterances:\n{intents}\n\
         ### User Message:\n\"{input}\"\n\n\
         ### Task:\nIdentify the intent above that best matches the user message.\n\n\
         ### Response Format:\n\
         {{ \"matchedBranch\": \"<intent name>\", \"confidenceScore\": <0-100> }}\n\n\
         If you are unsure, set \"matchedBranch\" to null."
    )
}

/// Shared jump resolution: action names resolve within the *current* step's
/// action list, not the destination step. A name that resolves to nothing is
/// treated as no action override.
pub(crate) fn resolve_jump(branch: &Branch, step: &FlowStep) -> RouteOverride {
    let next_action_index = branch.jump.action_id.as_deref().and_then(|name| {
        let index = step.actions.iter().position(|a| a.kind() == name);
        if index.is_none() {
            tracing::warn!(action = name, step = %step.id, "jump names an action not present in the step");
        }
        index
    });

    RouteOverride {
        next_step_id: branch.jump.step_id.clone(),
        next_action_index,
    }
}
