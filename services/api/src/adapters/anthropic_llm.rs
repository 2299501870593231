//! services/api/src/adapters/anthropic_llm.rs
//!
//! Messages-API adapter for the Anthropic model family. The official SDK is
//! JavaScript/Python only, so this talks to the HTTP API directly with a
//! `reqwest` JSON client.

use promptdesk_core::domain::{ChatMessage, Role};
use promptdesk_core::models::ModelId;
use promptdesk_core::ports::{PortError, PortResult};
use serde::{Deserialize, Serialize};

const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com/v1";
const ANTHROPIC_VERSION: &str = "2023-06-01";

pub struct AnthropicChatAdapter {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: Vec<WireMessage<'a>>,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(other)]
    Other,
}

impl AnthropicChatAdapter {
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: ANTHROPIC_BASE_URL.to_string(),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url,
        }
    }

    /// Sends one Messages-API request and returns the first text block, or an
    /// empty string when the reply carries none. No retries; the client's
    /// default timeout applies.
    pub async fn generate(
        &self,
        system: Option<&str>,
        turns: &[ChatMessage],
        model: ModelId,
    ) -> PortResult<String> {
        let messages: Vec<WireMessage<'_>> = turns
            .iter()
            .map(|turn| WireMessage {
                role: match turn.role {
                    Role::Assistant => "assistant",
                    Role::User | Role::System => "user",
                },
                content: &turn.content,
            })
            .collect();

        let request = MessagesRequest {
            model: model.backend_id(),
            max_tokens: 1000,
            temperature: 0.7,
            system,
            messages,
        };

        let response = self
            .client
            .post(format!("{}/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| PortError::Upstream(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PortError::Upstream(e.to_string()))?;

        if !status.is_success() {
            return Err(PortError::Upstream(format!(
                "API error ({}): {}",
                status, body
            )));
        }

        let parsed: MessagesResponse = serde_json::from_str(&body)
            .map_err(|e| PortError::Upstream(format!("Failed to parse response: {}", e)))?;

        let text = parsed
            .content
            .into_iter()
            .find_map(|block| match block {
                ContentBlock::Text { text } => Some(text),
                ContentBlock::Other => None,
            })
            .unwrap_or_default();

        Ok(text)
    }
}
