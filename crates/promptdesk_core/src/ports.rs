//! crates/promptdesk_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the
//! core to be independent of the concrete storage backend and AI providers.

use async_trait::async_trait;

use crate::domain::{
    ChatMessage, ChatReply, Conversation, Document, DocumentPatch, NewDocument,
};
use crate::models::ModelId;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    /// A requested capability has no configured credential.
    #[error("Configuration error: {0}")]
    Misconfigured(String),
    /// The upstream provider call failed or returned garbage.
    #[error("{0}")]
    Upstream(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Persistence for conversations. Backends are interchangeable and selected
/// once at process start; callers are agnostic to which one is active.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    async fn get(&self, id: &str) -> PortResult<Option<Conversation>>;

    /// Insert-or-replace by id. Always refreshes `updated_at`. Concurrent
    /// saves to the same id race on last-write-wins.
    async fn save(&self, conversation: Conversation) -> PortResult<Conversation>;

    /// Lists conversations, most recent activity first. With an owner filter,
    /// records with a null `user_id` are excluded.
    async fn list(&self, owner: Option<&str>) -> PortResult<Vec<Conversation>>;

    /// Returns whether a record existed and was removed.
    async fn delete(&self, id: &str) -> PortResult<bool>;
}

/// Persistence for documents. Same backend-selection model as conversations.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn create(&self, document: NewDocument) -> PortResult<Document>;

    async fn get(&self, id: &str) -> PortResult<Option<Document>>;

    /// Lists documents, most recently updated first, with the same owner
    /// filter semantics as conversations.
    async fn list(&self, owner: Option<&str>) -> PortResult<Vec<Document>>;

    /// Applies only the supplied fields and refreshes `updated_at`.
    /// Returns `None` if the id does not exist.
    async fn update(&self, id: &str, patch: DocumentPatch) -> PortResult<Option<Document>>;

    async fn delete(&self, id: &str) -> PortResult<bool>;
}

/// Routes a list of role-tagged messages to the right provider and normalizes
/// the reply. A leading `system` message is provider-level instructions rather
/// than a conversation turn. Exactly one outbound call per dispatch; no
/// retries, no response caching.
#[async_trait]
pub trait ChatModelService: Send + Sync {
    async fn generate(&self, messages: &[ChatMessage], model: ModelId) -> PortResult<ChatReply>;
}
