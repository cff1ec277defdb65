//! `send-message` — render and deliver one message to the conversation.
//!
//! The `text` engine renders static template content against the session;
//! the `ai` engine renders the prompt template, combines it with the
//! configured system prompt and the raw turn input, and asks the LLM
//! provider for the message. Empty content/prompt makes the action a no-op.

use parley_providers::{CompletionRequest, Message};

use crate::engine::error::EngineError;
use crate::engine::TurnCtx;
use crate::template;
use crate::types::{SendMessageEngine, SendMessageParams, Session};

pub(crate) async fn handle(
    session: &mut Session,
    params: &SendMessageParams,
    ctx: &TurnCtx<'_>,
) -> Result<(), EngineError> {
    let rendered = match params.engine {
        SendMessageEngine::Text => {
            let Some(content) = params.content.as_deref().filter(|c| !c.is_empty()) else {
                return Ok(());
            };
            template::render(content, &session.as_value())
        }
        SendMessageEngine::Ai => {
            let Some(prompt) = params.prompt.as_deref().filter(|p| !p.is_empty()) else {
                return Ok(());
            };
            let prompt = template::render(prompt, &session.as_value());
            let request = CompletionRequest {
                model: ctx.model.to_string(),
                messages: vec![
                    Message::system(ctx.system_prompt),
                    Message::system(prompt),
                    Message::user(ctx.input),
                ],
                temperature: None,
                max_tokens: None,
            };
            ctx.provider()?.complete(request).await?.content
        }
    };

    ctx.adapter
        .send_message(ctx.conversation_id, &rendered)
        .await?;
    session.output_messages.push(rendered);
    ctx.persist(session).await
}
