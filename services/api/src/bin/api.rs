//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{AnthropicChatAdapter, MemoryStore, ModelDispatcher, OpenAiChatAdapter, PgStore},
    config::Config,
    error::ApiError,
    web::{auth::AuthMode, build_router, rest::ApiDoc, state::AppState},
};
use async_openai::{config::OpenAIConfig, Client};
use axum::extract::DefaultBodyLimit;
use axum::http::{
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    HeaderValue, Method,
};
use axum::Router;
use promptdesk_core::ports::{ChatModelService, ConversationStore, DocumentStore};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Select the Storage Backend ---
    let (conversations, documents): (Arc<dyn ConversationStore>, Arc<dyn DocumentStore>) =
        match &config.database_url {
            Some(database_url) => {
                info!("Connecting to database...");
                let pool = PgPoolOptions::new()
                    .max_connections(5)
                    .connect(database_url)
                    .await?;
                let store = Arc::new(PgStore::new(pool));
                info!("Running database migrations...");
                store.run_migrations().await?;
                info!("Database migrations complete.");
                (store.clone(), store)
            }
            None => {
                warn!("DATABASE_URL is not set; using in-memory storage. Data is lost on restart.");
                let store = Arc::new(MemoryStore::new());
                (store.clone(), store)
            }
        };

    // --- 3. Initialize the Model Dispatcher ---
    let openai = config.openai_api_key.as_ref().map(|key| {
        OpenAiChatAdapter::new(Client::with_config(
            OpenAIConfig::new().with_api_key(key),
        ))
    });
    if openai.is_none() {
        warn!("OPENAI_API_KEY is not set; OpenAI models are disabled.");
    }
    let anthropic = config
        .anthropic_api_key
        .as_ref()
        .map(|key| AnthropicChatAdapter::new(key.clone()));
    if anthropic.is_none() {
        warn!("ANTHROPIC_API_KEY is not set; Anthropic models are disabled.");
    }
    let chat_model: Arc<dyn ChatModelService> = Arc::new(ModelDispatcher::new(openai, anthropic));

    // --- 4. Resolve the Auth Mode ---
    let auth = AuthMode::from_secret(config.auth_jwt_secret.as_deref());
    if config.auth_jwt_secret.is_none() {
        warn!("AUTH_JWT_SECRET is not set; all requests use the anonymous identity.");
    }

    // --- 5. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        conversations,
        documents,
        chat_model,
        auth,
    });

    let cors = CorsLayer::new()
        .allow_origin(
            config
                .cors_allowed_origin
                .parse::<HeaderValue>()
                .map_err(|e| ApiError::Internal(format!("Invalid CORS_ALLOWED_ORIGIN: {}", e)))?,
        )
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    // --- 6. Create the Web Router ---
    let api_router = build_router(app_state)
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .layer(cors);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 7. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
