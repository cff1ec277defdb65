//! `listen` — suspend the flow until the next user turn.
//!
//! The sole suspension trigger: the engine checks `waiting_for_input` after
//! every pointer advance and returns control to the caller when it is set.

use crate::engine::error::EngineError;
use crate::engine::TurnCtx;
use crate::types::Session;

pub(crate) async fn handle(session: &mut Session, ctx: &TurnCtx<'_>) -> Result<(), EngineError> {
    session.waiting_for_input = true;
    ctx.persist(session).await
}
