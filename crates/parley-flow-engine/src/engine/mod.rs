//! The turn engine — loads session state, executes actions, resolves the
//! next pointer, and suspends or ends the flow.
//!
//! One call to [`FlowMachine::handle_input`] advances a conversation by one
//! user turn. The engine keeps executing steps and actions in an explicit
//! loop until a `listen` action suspends the turn or the flow runs out of
//! steps; the loop is bounded by a configurable transition cap so a flow
//! graph with a cycle and no `listen` cannot spin forever.
//!
//! ```rust,ignore
//! let machine = FlowMachine::builder()
//!     .store(FileSessionStore::new("./sessions")?)
//!     .provider(OpenAICompatibleProvider::new(base_url, api_key, None, None))
//!     .build();
//! machine.register_adapter(ConsoleAdapter);
//! machine.load_flows("./flows")?;
//!
//! let result = machine.handle_input("console", "chat-1", "I need help").await?;
//! ```

mod builder;
pub mod error;

pub use builder::{FlowMachineBuilder, DEFAULT_MAX_TRANSITIONS};
pub use error::EngineError;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use parking_lot::{Mutex, RwLock};

use parley_providers::LLMProvider;

use crate::actions::{listen, send_message, set_context};
use crate::classifier::{self, RouteOverride};
use crate::loader;
use crate::traits::{session_key, ChatAdapter, SessionStore};
use crate::types::{Action, ClassifierEngine, Flow, Session, TurnResult};

/// How [`FlowMachine::initiate_flow`] should start the new session.
#[derive(Debug, Clone, Default)]
pub enum StartMode {
    /// Create the session only; the first turn arrives later.
    #[default]
    Manual,
    /// Run the first turn immediately with an empty synthetic input.
    Immediate,
    /// Run the first turn immediately with the given synthetic input.
    ImmediateWith(String),
}

/// Explicit execution context passed into every action handler.
pub(crate) struct TurnCtx<'a> {
    pub conversation_id: &'a str,
    pub input: &'a str,
    pub adapter: Arc<dyn ChatAdapter>,
    pub store: &'a Arc<dyn SessionStore>,
    pub provider: Option<&'a Arc<dyn LLMProvider>>,
    pub system_prompt: &'a str,
    pub model: &'a str,
    pub session_ttl: Option<Duration>,
}

impl TurnCtx<'_> {
    pub(crate) fn provider(&self) -> Result<&Arc<dyn LLMProvider>, EngineError> {
        self.provider.ok_or(EngineError::ProviderNotConfigured)
    }

    pub(crate) async fn persist(&self, session: &Session) -> Result<(), EngineError> {
        self.store
            .set(
                &session_key(self.conversation_id),
                session,
                self.session_ttl,
            )
            .await?;
        Ok(())
    }
}

/// The assembled flow engine.
///
/// All mutable per-conversation state lives in the injected
/// [`SessionStore`]; the flow set and adapter registry are written at
/// configuration time and are read-only on the turn path.
pub struct FlowMachine {
    pub(super) flows: RwLock<Vec<Flow>>,
    pub(super) adapters: RwLock<HashMap<String, Arc<dyn ChatAdapter>>>,
    pub(super) store: Arc<dyn SessionStore>,
    pub(super) provider: Option<Arc<dyn LLMProvider>>,
    pub(super) model: String,
    pub(super) system_prompt: RwLock<String>,
    pub(super) session_ttl: Option<Duration>,
    pub(super) max_transitions: usize,
    /// One turn at a time per conversation id.
    pub(super) turn_locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl FlowMachine {
    /// Create a new [`FlowMachineBuilder`].
    pub fn builder() -> FlowMachineBuilder {
        FlowMachineBuilder::new()
    }

    // -----------------------------------------------------------------------
    // Configuration
    // -----------------------------------------------------------------------

    /// Register an outbound transport under its name. A later registration
    /// with the same name replaces the earlier one.
    pub fn register_adapter(&self, adapter: impl ChatAdapter + 'static) {
        let adapter: Arc<dyn ChatAdapter> = Arc::new(adapter);
        self.adapters
            .write()
            .insert(adapter.name().to_string(), adapter);
    }

    /// Add a flow to the loaded set.
    pub fn register_flow(&self, flow: Flow) {
        self.flows.write().push(flow);
    }

    /// Load every flow file in `dir` into the loaded set. Returns how many
    /// flows were added.
    pub fn load_flows(&self, dir: impl AsRef<std::path::Path>) -> Result<usize, EngineError> {
        let flows = loader::load_flows_from_dir(dir)?;
        let count = flows.len();
        self.flows.write().extend(flows);
        Ok(count)
    }

    /// System prompt prepended to AI-generated messages.
    pub fn set_system_prompt(&self, prompt: impl Into<String>) {
        *self.system_prompt.write() = prompt.into();
    }

    /// Slugs of the loaded flows, in load order.
    pub fn flow_slugs(&self) -> Vec<String> {
        self.flows.read().iter().map(|f| f.slug.clone()).collect()
    }

    // -----------------------------------------------------------------------
    // Entry points
    // -----------------------------------------------------------------------

    /// Create a session for `conversation_id`, selecting the flow by
    /// `override_flow` or by trigger classification of `message`.
    ///
    /// With [`StartMode::Immediate`] / [`StartMode::ImmediateWith`] the first
    /// turn runs before returning; the result is the stored session after
    /// that turn, or `None` if it already ended the flow.
    pub async fn initiate_flow(
        &self,
        adapter_name: &str,
        conversation_id: &str,
        message: &str,
        override_flow: Option<&str>,
        start: StartMode,
    ) -> Result<Option<Session>, EngineError> {
        let session = self
            .create_session(adapter_name, conversation_id, message, override_flow)
            .await?;

        let first_input = match start {
            StartMode::Manual => return Ok(Some(session)),
            StartMode::Immediate => String::new(),
            StartMode::ImmediateWith(input) => input,
        };

        self.handle_input(adapter_name, conversation_id, &first_input)
            .await?;
        Ok(self.store.get(&session_key(conversation_id)).await?)
    }

    /// Handle one user turn for `conversation_id`.
    ///
    /// If no session exists, one is created by classifying `input` against
    /// the loaded flows' trigger utterances. Execution then advances until a
    /// `listen` suspends the turn or the flow ends.
    pub async fn handle_input(
        &self,
        adapter_name: &str,
        conversation_id: &str,
        input: &str,
    ) -> Result<TurnResult, EngineError> {
        let lock = self.turn_lock(conversation_id);
        let _turn = lock.lock().await;

        let key = session_key(conversation_id);

        let mut session = match self.store.get(&key).await? {
            Some(existing) => existing,
            None => {
                self.create_session(adapter_name, conversation_id, input, None)
                    .await?
            }
        };

        session.waiting_for_input = false;
        session.last_input = Some(input.to_string());
        self.store.set(&key, &session, self.session_ttl).await?;

        let mut transitions = 0usize;
        loop {
            transitions += 1;
            if transitions > self.max_transitions {
                return Err(EngineError::CyclicFlowDetected {
                    flow: session.flow.slug.clone(),
                    limit: self.max_transitions,
                });
            }

            let step = session
                .flow
                .step(&session.current_step_id)
                .cloned()
                .ok_or_else(|| EngineError::StepNotFound {
                    step_id: session.current_step_id.clone(),
                })?;

            let action = step.actions.get(session.current_step_action_index).cloned();

            let route = if let Some(action) = action {
                let adapter = self.adapter(adapter_name)?;
                let system_prompt = self.system_prompt.read().clone();
                let ctx = TurnCtx {
                    conversation_id,
                    input,
                    adapter,
                    store: &self.store,
                    provider: self.provider.as_ref(),
                    system_prompt: &system_prompt,
                    model: &self.model,
                    session_ttl: self.session_ttl,
                };
                match &action {
                    Action::SendMessage(params) => {
                        send_message::handle(&mut session, params, &ctx).await?;
                        RouteOverride::default()
                    }
                    Action::Listen => {
                        listen::handle(&mut session, &ctx).await?;
                        RouteOverride::default()
                    }
                    Action::Classify(params) => {
                        classifier::classify(params, &step, input, &ctx).await?
                    }
                    Action::SetContext(params) => {
                        set_context::handle(&mut session, params, &ctx).await?;
                        RouteOverride::default()
                    }
                    Action::NoOp | Action::Unknown => RouteOverride::default(),
                }
            } else {
                RouteOverride::default()
            };

            // Handlers persist their own mutations; re-read so the freshest
            // context and output state drive the rest of the pass.
            if let Some(fresh) = self.store.get(&key).await? {
                session = fresh;
            }

            if session.executed_steps.last().map(|s| s.id.as_str()) != Some(step.id.as_str()) {
                session.executed_steps.push(step.clone());
            }

            // Next-pointer resolution, highest precedence first.
            let current_index = session.current_step_action_index;
            let (target_step, target_index) = match (route.next_step_id, route.next_action_index) {
                (Some(step_id), Some(index)) => (Some(step_id), Some(index)),
                (Some(step_id), None) => (Some(step_id), None),
                (None, Some(index)) => (Some(step.id.clone()), Some(index)),
                (None, None) => {
                    if current_index + 1 < step.actions.len() {
                        (Some(step.id.clone()), Some(current_index + 1))
                    } else if let (Some(next_step), Some(entry_action)) =
                        (step.next_step.as_ref(), step.next_step_action_id.as_ref())
                    {
                        let index = session.flow.step(next_step).and_then(|s| {
                            s.actions
                                .iter()
                                .position(|a| a.kind() == entry_action.as_str())
                        });
                        if index.is_none() {
                            tracing::warn!(
                                step = %next_step,
                                action = %entry_action,
                                "next_step_action_id does not resolve; entering at the first action"
                            );
                        }
                        (Some(next_step.clone()), index)
                    } else {
                        (step.next_step.clone(), None)
                    }
                }
            };

            let Some(target) = target_step else {
                self.store.delete(&key).await?;
                self.turn_locks.lock().remove(conversation_id);
                tracing::info!(flow = %session.flow.name, conversation = conversation_id, "flow ended");
                return Ok(TurnResult {
                    executed_steps: session.executed_steps,
                    output_messages: session.output_messages,
                    waiting_for_input: false,
                    flow_ended: true,
                });
            };

            session.current_step_id = target;
            session.current_step_action_index = target_index.unwrap_or(0);
            self.store.set(&key, &session, self.session_ttl).await?;
            tracing::debug!(
                step = %session.current_step_id,
                action_index = session.current_step_action_index,
                "advanced pointer"
            );

            if session.waiting_for_input {
                let output_messages = std::mem::take(&mut session.output_messages);
                self.store.set(&key, &session, self.session_ttl).await?;
                return Ok(TurnResult {
                    executed_steps: session.executed_steps,
                    output_messages,
                    waiting_for_input: true,
                    flow_ended: false,
                });
            }
        }
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    async fn create_session(
        &self,
        adapter_name: &str,
        conversation_id: &str,
        message: &str,
        override_flow: Option<&str>,
    ) -> Result<Session, EngineError> {
        let flow = match override_flow {
            Some(slug) => self
                .flows
                .read()
                .iter()
                .find(|f| f.slug == slug)
                .cloned()
                .ok_or_else(|| EngineError::FlowNotFound {
                    slug: slug.to_string(),
                })?,
            None => self.classify_trigger(message)?,
        };

        let first_step_id = flow
            .steps
            .first()
            .map(|s| s.id.clone())
            .ok_or_else(|| EngineError::MalformedFlow {
                message: format!("flow {} has no steps", flow.slug),
            })?;

        let session = Session {
            conversation_id: conversation_id.to_string(),
            adapter_name: adapter_name.to_string(),
            current_step_id: first_step_id,
            current_step_action_index: 0,
            context: Default::default(),
            waiting_for_input: false,
            output_messages: Vec::new(),
            executed_steps: Vec::new(),
            last_input: None,
            started_at: Utc::now(),
            flow,
        };

        self.store
            .set(&session_key(conversation_id), &session, self.session_ttl)
            .await?;
        tracing::info!(flow = %session.flow.name, conversation = conversation_id, "flow started");
        Ok(session)
    }

    /// Keyword-only trigger classification across the loaded flow set, in
    /// load order. AI classification never participates in initial flow
    /// selection.
    fn classify_trigger(&self, message: &str) -> Result<Flow, EngineError> {
        let message = message.to_lowercase();
        let flows = self.flows.read();
        for flow in flows.iter() {
            if flow.classifier != ClassifierEngine::Basic || flow.utterances.is_empty() {
                continue;
            }
            if flow
                .utterances
                .iter()
                .any(|u| message.contains(&u.to_lowercase()))
            {
                return Ok(flow.clone());
            }
        }
        Err(EngineError::FlowNotFound {
            slug: "<unmatched trigger>".to_string(),
        })
    }

    fn adapter(&self, name: &str) -> Result<Arc<dyn ChatAdapter>, EngineError> {
        self.adapters
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| EngineError::AdapterNotFound {
                name: name.to_string(),
            })
    }

    fn turn_lock(&self, conversation_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        self.turn_locks
            .lock()
            .entry(conversation_id.to_string())
            .or_default()
            .clone()
    }
}
