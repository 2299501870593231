//! services/api/src/web/state.rs
//!
//! Defines the application's shared state. Construction happens once in the
//! binary (or a test) and passes the chosen implementations explicitly; there
//! is no ambient global state.

use std::sync::Arc;

use promptdesk_core::ports::{ChatModelService, ConversationStore, DocumentStore};

use crate::web::auth::AuthMode;

/// The shared application state, created once at startup and passed to all
/// handlers. Handlers only see the port traits, never a concrete backend.
#[derive(Clone)]
pub struct AppState {
    pub conversations: Arc<dyn ConversationStore>,
    pub documents: Arc<dyn DocumentStore>,
    pub chat_model: Arc<dyn ChatModelService>,
    pub auth: AuthMode,
}
