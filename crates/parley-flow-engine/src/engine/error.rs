//! Engine error types.

use thiserror::Error;

use crate::errors::{AdapterError, FlowLoadError, SessionStoreError};

/// Errors from [`FlowMachine`](super::FlowMachine) operations.
///
/// All are fatal to the current turn and none are retried internally: each
/// stems from a data or configuration defect, not a transient condition.
/// The engine performs no rollback — state persisted by earlier handlers
/// within the failing turn remains persisted.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EngineError {
    /// Classification or an explicit override named a flow that is not loaded.
    #[error("flow not found: {slug}")]
    FlowNotFound { slug: String },
    /// The session's current step id does not exist in its flow.
    #[error("step not found: {step_id}")]
    StepNotFound { step_id: String },
    /// Dispatch named an adapter that was never registered.
    #[error("adapter not found: {name}")]
    AdapterNotFound { name: String },
    /// A classify action found no match and its branch set has no default.
    #[error("no fallback branch in step {step_id}")]
    NoFallbackBranch { step_id: String },
    /// A provider call returned output that cannot be parsed into the
    /// expected shape.
    #[error("malformed provider response: {message}")]
    MalformedProviderResponse { message: String },
    /// The turn exceeded the transition bound without suspending or ending.
    #[error("cyclic flow detected in {flow}: exceeded {limit} transitions")]
    CyclicFlowDetected { flow: String, limit: usize },
    /// A flow dereferenced at the point of use is unusable.
    #[error("malformed flow: {message}")]
    MalformedFlow { message: String },
    /// An AI-mode action ran on an engine built without an LLM provider.
    #[error("no LLM provider configured")]
    ProviderNotConfigured,
    /// A session store error occurred.
    #[error("session store error: {0}")]
    SessionStore(#[from] SessionStoreError),
    /// An adapter error occurred.
    #[error("adapter error: {0}")]
    Adapter(#[from] AdapterError),
    /// A provider error occurred.
    #[error("provider error: {0}")]
    Provider(#[from] parley_providers::ProviderError),
    /// A flow file failed to load.
    #[error("flow load error: {0}")]
    FlowLoad(#[from] FlowLoadError),
}
