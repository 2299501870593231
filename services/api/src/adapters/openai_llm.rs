//! services/api/src/adapters/openai_llm.rs
//!
//! Chat-completion adapter for the OpenAI model family.

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use promptdesk_core::domain::{ChatMessage, Role};
use promptdesk_core::models::ModelId;
use promptdesk_core::ports::{PortError, PortResult};

pub struct OpenAiChatAdapter {
    client: Client<OpenAIConfig>,
}

impl OpenAiChatAdapter {
    pub fn new(client: Client<OpenAIConfig>) -> Self {
        Self { client }
    }

    /// Sends one chat-completion request and returns the raw reply text,
    /// which may be empty. The dispatcher owns error normalization and the
    /// empty-reply policy.
    pub async fn generate(
        &self,
        system: Option<&str>,
        turns: &[ChatMessage],
        model: ModelId,
    ) -> PortResult<String> {
        let mut messages = Vec::with_capacity(turns.len() + 1);
        if let Some(system) = system {
            messages.push(ChatCompletionRequestMessage::System(
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(system)
                    .build()
                    .map_err(|e| PortError::Unexpected(e.to_string()))?,
            ));
        }
        for turn in turns {
            let message = match turn.role {
                Role::User | Role::System => ChatCompletionRequestMessage::User(
                    ChatCompletionRequestUserMessageArgs::default()
                        .content(turn.content.clone())
                        .build()
                        .map_err(|e| PortError::Unexpected(e.to_string()))?,
                ),
                Role::Assistant => ChatCompletionRequestMessage::Assistant(
                    ChatCompletionRequestAssistantMessageArgs::default()
                        .content(turn.content.clone())
                        .build()
                        .map_err(|e| PortError::Unexpected(e.to_string()))?,
                ),
            };
            messages.push(message);
        }

        let request = CreateChatCompletionRequestArgs::default()
            .model(model.backend_id())
            .messages(messages)
            .max_tokens(1000u32)
            .temperature(0.7)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| PortError::Upstream(e.to_string()))?;

        let text = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .unwrap_or_default();

        Ok(text)
    }
}
