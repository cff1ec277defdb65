//! Action handlers, one module per action kind.
//!
//! Each handler is a function of (session, parameters, execution context).
//! Handlers may mutate the session, append to its output messages, deliver
//! through the adapter, and persist via the store. Only `listen` decides
//! suspension; only `classify` (which lives in [`crate::classifier`])
//! returns a routing override.

pub(crate) mod listen;
pub(crate) mod send_message;
pub(crate) mod set_context;
