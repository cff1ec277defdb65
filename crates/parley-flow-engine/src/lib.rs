//! Parley — a conversational flow engine.
//!
//! A flow is a declarative script of steps, each holding an ordered list of
//! actions (send a message, wait for input, classify input, set context).
//! The engine executes a flow one user turn at a time: it loads the
//! conversation's session state, runs actions until a `listen` suspends the
//! turn or the flow ends, and persists the execution cursor between turns so
//! the hosting process can stay stateless between calls.
//!
//! The engine is designed to be embedded. Storage, outbound transport, and
//! text generation are injected capabilities; in-memory, file-backed, and
//! console defaults ship in [`defaults`].

pub(crate) mod actions;
pub(crate) mod classifier;
pub mod defaults;
pub mod engine;
pub mod errors;
pub mod loader;
pub mod template;
pub mod traits;
pub mod types;

// Re-export public types at the crate level.

// defaults
pub use defaults::{ConsoleAdapter, FileSessionStore, InMemorySessionStore};

// engine
pub use engine::{EngineError, FlowMachine, FlowMachineBuilder, StartMode};

// errors
pub use errors::{AdapterError, FlowLoadError, SessionStoreError};

// loader
pub use loader::load_flows_from_dir;

// traits
pub use traits::{session_key, ChatAdapter, SessionStore};

// types
pub use types::{
    Action, Branch, ClassifierEngine, ClassifyParams, Flow, FlowStep, Jump, SendMessageEngine,
    SendMessageParams, Session, SetContextParams, TurnResult,
};
