//! crates/promptdesk_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or web framework; they carry
//! serde derives because conversation history is stored and shipped as JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::ModelId;

/// The author of a single conversation turn.
///
/// `System` never appears in stored history; it is only used to pass
/// provider-level instructions to the model dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One turn of a conversation: who said it, what was said, and which logical
/// model produced (or received) it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<ModelId>,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
            model: None,
        }
    }

    pub fn user(content: impl Into<String>, model: Option<ModelId>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            model,
        }
    }

    pub fn assistant(content: impl Into<String>, model: Option<ModelId>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            model,
        }
    }
}

/// Informational lifecycle marker on a conversation. Nothing in the current
/// feature set gates behavior on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationStep {
    #[default]
    Chatting,
    Completed,
}

/// A named sequence of user/assistant turns plus metadata, identified by an
/// opaque id of the form `conv_<unix-millis>_<random-suffix>`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    pub current_step: ConversationStep,
    pub initial_description: String,
    pub selected_model: ModelId,
    pub conversation_history: Vec<ChatMessage>,
    pub user_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// Starts a new conversation from its first user message.
    pub fn new(
        initial_description: impl Into<String>,
        selected_model: ModelId,
        user_id: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Self::generate_id(now),
            current_step: ConversationStep::Chatting,
            initial_description: initial_description.into(),
            selected_model,
            conversation_history: Vec::new(),
            user_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Generates a fresh conversation id. The millisecond portion doubles as a
    /// creation-time proxy for ordering in the in-memory backend.
    fn generate_id(now: DateTime<Utc>) -> String {
        let suffix: String = Uuid::new_v4().simple().to_string();
        format!("conv_{}_{}", now.timestamp_millis(), &suffix[..9])
    }

    /// The numeric millis portion of the id, used by the in-memory backend as
    /// an explicit creation-time approximation.
    pub fn id_timestamp_millis(&self) -> i64 {
        self.id
            .split('_')
            .nth(1)
            .and_then(|part| part.parse::<i64>().ok())
            .unwrap_or(0)
    }
}

/// An owned, freeform title+content record with a lifecycle independent from
/// conversations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub title: String,
    pub content: String,
    pub user_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when creating a document; the store assigns the rest.
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub title: String,
    pub content: String,
    pub user_id: Option<String>,
}

/// A partial document update. Only supplied fields are applied.
#[derive(Debug, Clone, Default)]
pub struct DocumentPatch {
    pub title: Option<String>,
    pub content: Option<String>,
}

/// The normalized reply from a model dispatch: the text plus the logical model
/// name the caller asked for (never the backend alias).
#[derive(Debug, Clone)]
pub struct ChatReply {
    pub response: String,
    pub model: ModelId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversation_ids_are_unique_and_carry_a_timestamp() {
        let a = Conversation::new("hello", ModelId::default(), None);
        let b = Conversation::new("hello", ModelId::default(), None);
        assert_ne!(a.id, b.id);
        assert!(a.id.starts_with("conv_"));
        assert!(a.id_timestamp_millis() > 0);
    }

    #[test]
    fn history_roles_serialize_lowercase() {
        let msg = ChatMessage::user("hi", Some(ModelId::Gpt4o));
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["role"], "user");
        assert_eq!(json["model"], "gpt-4o");
    }
}
