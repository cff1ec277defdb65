//! Core data model: flows, steps, actions, and session state.

mod flow;
mod session;

pub use flow::{
    Action, Branch, ClassifierEngine, ClassifyParams, Flow, FlowStep, Jump, SendMessageEngine,
    SendMessageParams, SetContextParams,
};
pub use session::{Session, TurnResult};
