//! `set-context` — store a rendered value in the session context.

use serde_json::Value;

use crate::engine::error::EngineError;
use crate::engine::TurnCtx;
use crate::template;
use crate::types::{Session, SetContextParams};

pub(crate) async fn handle(
    session: &mut Session,
    params: &SetContextParams,
    ctx: &TurnCtx<'_>,
) -> Result<(), EngineError> {
    let value = template::render(&params.value, &session.as_value());
    session
        .context
        .insert(params.key.clone(), Value::String(value));
    ctx.persist(session).await
}
