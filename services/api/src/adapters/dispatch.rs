//! services/api/src/adapters/dispatch.rs
//!
//! The model dispatcher: implements the `ChatModelService` port by routing a
//! request to the adapter for the logical model's provider family. Which
//! families are available is decided once at startup from credential presence.

use async_trait::async_trait;
use promptdesk_core::domain::{ChatMessage, ChatReply, Role};
use promptdesk_core::models::{ModelId, Provider};
use promptdesk_core::ports::{ChatModelService, PortError, PortResult};
use tracing::error;

use super::anthropic_llm::AnthropicChatAdapter;
use super::openai_llm::OpenAiChatAdapter;

/// Substituted for an empty or malformed provider reply so an assistant turn
/// is never empty.
pub const EMPTY_REPLY_APOLOGY: &str =
    "I'm sorry, I couldn't generate a response. Please try again.";

pub struct ModelDispatcher {
    openai: Option<OpenAiChatAdapter>,
    anthropic: Option<AnthropicChatAdapter>,
}

impl ModelDispatcher {
    pub fn new(openai: Option<OpenAiChatAdapter>, anthropic: Option<AnthropicChatAdapter>) -> Self {
        Self { openai, anthropic }
    }
}

/// Splits a leading `system` entry off the message list; it is passed as
/// provider-level instructions rather than as a conversation turn.
fn split_system(messages: &[ChatMessage]) -> (Option<&str>, &[ChatMessage]) {
    match messages.split_first() {
        Some((first, rest)) if first.role == Role::System => (Some(first.content.as_str()), rest),
        _ => (None, messages),
    }
}

#[async_trait]
impl ChatModelService for ModelDispatcher {
    async fn generate(&self, messages: &[ChatMessage], model: ModelId) -> PortResult<ChatReply> {
        if messages.is_empty() {
            return Err(PortError::Unexpected(
                "at least one message is required".to_string(),
            ));
        }
        let (system, turns) = split_system(messages);

        let result = match model.provider() {
            Provider::OpenAi => {
                let adapter = self.openai.as_ref().ok_or_else(|| {
                    PortError::Misconfigured(
                        "OpenAI models are not available. Set OPENAI_API_KEY to enable them."
                            .to_string(),
                    )
                })?;
                adapter.generate(system, turns, model).await
            }
            Provider::Anthropic => {
                let adapter = self.anthropic.as_ref().ok_or_else(|| {
                    PortError::Misconfigured(
                        "Anthropic models are not available. Set ANTHROPIC_API_KEY to enable them."
                            .to_string(),
                    )
                })?;
                adapter.generate(system, turns, model).await
            }
        };

        let text = match result {
            Ok(text) => text,
            Err(e) => {
                error!(model = %model, error = %e, "Model provider call failed");
                return Err(PortError::Upstream(format!(
                    "Failed to generate response with {}. Please try again.",
                    model
                )));
            }
        };

        let response = if text.trim().is_empty() {
            EMPTY_REPLY_APOLOGY.to_string()
        } else {
            text
        };

        // Callers always observe the logical name they asked for.
        Ok(ChatReply { response, model })
    }
}
