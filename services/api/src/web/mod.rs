pub mod auth;
pub mod envelope;
pub mod rest;
pub mod state;

use std::sync::Arc;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};

use crate::web::auth::{auth_context, require_auth};

pub use auth::AuthUser;
pub use envelope::ApiFailure;
pub use state::AppState;

/// Builds the API router: the health check is public, everything else sits
/// behind the auth gate. The binary layers CORS, body limits, and Swagger UI
/// on top of this; tests drive it directly.
pub fn build_router(state: Arc<AppState>) -> Router {
    let public_routes = Router::new().route("/api/health", get(rest::health_handler));

    let protected_routes = Router::new()
        .route("/api/chat", post(rest::chat_handler))
        .route(
            "/api/craft-super-prompt",
            post(rest::craft_super_prompt_handler),
        )
        .route("/api/conversations", get(rest::list_conversations_handler))
        .route(
            "/api/conversations/{id}",
            get(rest::get_conversation_handler).delete(rest::delete_conversation_handler),
        )
        .route(
            "/api/documents",
            post(rest::create_document_handler).get(rest::list_documents_handler),
        )
        .route(
            "/api/documents/{id}",
            get(rest::get_document_handler)
                .put(rest::update_document_handler)
                .delete(rest::delete_document_handler),
        )
        .layer(axum_middleware::from_fn(require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            auth_context,
        ))
        .with_state(state)
}
