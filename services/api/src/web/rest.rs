//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

const CHAT_SYSTEM_INSTRUCTIONS: &str =
    "You are a helpful, intelligent, and friendly AI assistant.";

const SUPER_PROMPT_INSTRUCTIONS: &str = r#"You are an expert prompt engineer specializing in creating highly effective, structured prompts that minimize hallucination and maximize accuracy. Your task is to transform user prompts into comprehensive, systematic prompts using the following template structure:

"You are [ROLE] specializing in [DOMAIN/EXPERTISE]. Your responses must be accurate and minimize hallucination through systematic verification.

Context: [USER'S TASK/SITUATION]
Objective: [MAIN GOAL]

Instructions:
1. Decompose complex requests into subtasks
2. Verify information and cross-reference sources
3. Handle uncertainty explicitly with disclaimers
4. Engage domain experts when needed
5. Synthesize verified solutions

Constraints: [LIMITATIONS]
Format: [STRUCTURE]
Success: [CRITERIA]"

Guidelines for crafting the super prompt:
1. Analyze the user's original prompt to identify the domain, role, and objective
2. Fill in each section thoughtfully based on the user's request
3. Make the role specific and relevant to the task
4. Define clear, measurable success criteria
5. Include relevant constraints and formatting requirements
6. Ensure the enhanced prompt will produce more accurate, structured responses

Transform the user's prompt into this structured format, making it more comprehensive and effective."#;

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Json},
    Extension,
};
use promptdesk_core::domain::{ChatMessage, Conversation, Document, DocumentPatch, NewDocument};
use promptdesk_core::models::ModelId;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::{OpenApi, ToSchema};

use crate::web::auth::AuthUser;
use crate::web::envelope::{ApiFailure, ApiJson, FailureBody};
use crate::web::state::AppState;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        health_handler,
        chat_handler,
        craft_super_prompt_handler,
        list_conversations_handler,
        get_conversation_handler,
        delete_conversation_handler,
        create_document_handler,
        list_documents_handler,
        get_document_handler,
        update_document_handler,
        delete_document_handler,
    ),
    components(
        schemas(
            ChatRequest,
            ChatResponse,
            SuperPromptRequest,
            SuperPromptResponse,
            CreateDocumentRequest,
            UpdateDocumentRequest,
            HealthResponse,
            DeleteResponse,
            FailureBody,
        )
    ),
    tags(
        (name = "PromptDesk API", description = "Chat, prompt enhancement, and saved-document endpoints.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Request and Response Payload Structs
//=========================================================================================

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>, example = "gpt-4o")]
    pub model: Option<ModelId>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub success: bool,
    pub response: String,
    pub conversation_id: String,
    #[schema(value_type = String)]
    pub model: ModelId,
}

#[derive(Deserialize, ToSchema)]
pub struct SuperPromptRequest {
    pub prompt: String,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub model: Option<ModelId>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuperPromptResponse {
    pub success: bool,
    pub enhanced_prompt: String,
}

#[derive(Serialize)]
pub struct ConversationResponse {
    pub success: bool,
    pub conversation: Conversation,
}

#[derive(Serialize)]
pub struct ConversationListResponse {
    pub success: bool,
    pub conversations: Vec<Conversation>,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateDocumentRequest {
    pub title: String,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateDocumentRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Serialize)]
pub struct DocumentResponse {
    pub success: bool,
    pub document: Document,
}

#[derive(Serialize)]
pub struct DocumentListResponse {
    pub success: bool,
    pub documents: Vec<Document>,
}

#[derive(Serialize, ToSchema)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
}

//=========================================================================================
// Health and Chat Handlers
//=========================================================================================

/// Health check.
#[utoipa::path(
    get,
    path = "/api/health",
    responses((status = 200, description = "API is reachable", body = HealthResponse))
)]
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        success: true,
        message: "API is working".to_string(),
    })
}

/// Send a chat message, creating a conversation on first use.
///
/// Without a `conversationId` a new conversation is created and its id
/// returned; with one, exactly two history entries are appended. A supplied
/// `model` becomes the conversation's selected model (last-write-wins).
#[utoipa::path(
    post,
    path = "/api/chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Assistant reply", body = ChatResponse),
        (status = 400, description = "Invalid request or provider misconfigured", body = FailureBody),
        (status = 401, description = "Not authenticated", body = FailureBody),
        (status = 404, description = "Unknown conversation id", body = FailureBody),
        (status = 500, description = "Provider call failed", body = FailureBody)
    )
)]
pub async fn chat_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    ApiJson(req): ApiJson<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiFailure> {
    if req.message.trim().is_empty() {
        return Err(ApiFailure::bad_request("Please provide a message"));
    }

    let mut conversation = match &req.conversation_id {
        Some(id) => state
            .conversations
            .get(id)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to fetch conversation");
                ApiFailure::internal("Failed to process message")
            })?
            .ok_or_else(|| ApiFailure::not_found("Conversation not found"))?,
        None => Conversation::new(
            req.message.clone(),
            req.model.unwrap_or_default(),
            Some(user.user_id.clone()),
        ),
    };

    if let Some(model) = req.model {
        conversation.selected_model = model;
    }
    let model = conversation.selected_model;

    let mut messages = Vec::with_capacity(conversation.conversation_history.len() + 2);
    messages.push(ChatMessage::system(CHAT_SYSTEM_INSTRUCTIONS));
    messages.extend(conversation.conversation_history.iter().cloned());
    messages.push(ChatMessage::user(req.message.clone(), Some(model)));

    let reply = state.chat_model.generate(&messages, model).await?;

    conversation
        .conversation_history
        .push(ChatMessage::user(req.message, Some(model)));
    conversation
        .conversation_history
        .push(ChatMessage::assistant(reply.response.clone(), Some(reply.model)));

    // The reply is already in hand; a failed history write diverges stored
    // state from what the client saw, so it is logged loudly but the reply
    // is still returned.
    let conversation_id = conversation.id.clone();
    if let Err(e) = state.conversations.save(conversation).await {
        error!(conversation_id = %conversation_id, error = %e, "Failed to persist conversation history");
    }

    Ok(Json(ChatResponse {
        success: true,
        response: reply.response,
        conversation_id,
        model: reply.model,
    }))
}

/// Enhance a prompt into a structured "super prompt".
#[utoipa::path(
    post,
    path = "/api/craft-super-prompt",
    request_body = SuperPromptRequest,
    responses(
        (status = 200, description = "Enhanced prompt", body = SuperPromptResponse),
        (status = 400, description = "Invalid request or provider misconfigured", body = FailureBody),
        (status = 401, description = "Not authenticated", body = FailureBody),
        (status = 500, description = "Provider call failed", body = FailureBody)
    )
)]
pub async fn craft_super_prompt_handler(
    State(state): State<Arc<AppState>>,
    Extension(_user): Extension<AuthUser>,
    ApiJson(req): ApiJson<SuperPromptRequest>,
) -> Result<Json<SuperPromptResponse>, ApiFailure> {
    if req.prompt.trim().is_empty() {
        return Err(ApiFailure::bad_request("Please provide a prompt to enhance"));
    }

    let model = req.model.unwrap_or_default();
    let messages = vec![
        ChatMessage::system(SUPER_PROMPT_INSTRUCTIONS),
        ChatMessage::user(
            format!("Transform this prompt into a super prompt: \"{}\"", req.prompt),
            Some(model),
        ),
    ];

    let reply = state.chat_model.generate(&messages, model).await?;

    Ok(Json(SuperPromptResponse {
        success: true,
        enhanced_prompt: reply.response,
    }))
}

//=========================================================================================
// Conversation Handlers
//=========================================================================================

/// List the caller's conversations, most recent first.
#[utoipa::path(
    get,
    path = "/api/conversations",
    responses(
        (status = 200, description = "Conversation list"),
        (status = 401, description = "Not authenticated", body = FailureBody)
    )
)]
pub async fn list_conversations_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ConversationListResponse>, ApiFailure> {
    let conversations = state
        .conversations
        .list(Some(&user.user_id))
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to fetch conversations");
            ApiFailure::internal("Failed to fetch conversations")
        })?;

    Ok(Json(ConversationListResponse {
        success: true,
        conversations,
    }))
}

/// Fetch one conversation with its full history.
#[utoipa::path(
    get,
    path = "/api/conversations/{id}",
    params(("id" = String, Path, description = "Conversation id")),
    responses(
        (status = 200, description = "The conversation"),
        (status = 401, description = "Not authenticated", body = FailureBody),
        (status = 404, description = "Unknown conversation id", body = FailureBody)
    )
)]
pub async fn get_conversation_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ConversationResponse>, ApiFailure> {
    let conversation = state
        .conversations
        .get(&id)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to fetch conversation");
            ApiFailure::internal("Failed to fetch conversation")
        })?
        .ok_or_else(|| ApiFailure::not_found("Conversation not found"))?;

    Ok(Json(ConversationResponse {
        success: true,
        conversation,
    }))
}

/// Delete a conversation.
#[utoipa::path(
    delete,
    path = "/api/conversations/{id}",
    params(("id" = String, Path, description = "Conversation id")),
    responses(
        (status = 200, description = "Deleted", body = DeleteResponse),
        (status = 401, description = "Not authenticated", body = FailureBody),
        (status = 404, description = "Unknown conversation id", body = FailureBody)
    )
)]
pub async fn delete_conversation_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiFailure> {
    let removed = state.conversations.delete(&id).await.map_err(|e| {
        error!(error = %e, "Failed to delete conversation");
        ApiFailure::internal("Failed to delete conversation")
    })?;

    if !removed {
        return Err(ApiFailure::not_found("Conversation not found"));
    }

    Ok(Json(DeleteResponse {
        success: true,
        message: "Conversation deleted successfully".to_string(),
    }))
}

//=========================================================================================
// Document Handlers
//=========================================================================================

/// Create a document. Content defaults to an empty string.
#[utoipa::path(
    post,
    path = "/api/documents",
    request_body = CreateDocumentRequest,
    responses(
        (status = 200, description = "The created document"),
        (status = 400, description = "Missing title", body = FailureBody),
        (status = 401, description = "Not authenticated", body = FailureBody)
    )
)]
pub async fn create_document_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    ApiJson(req): ApiJson<CreateDocumentRequest>,
) -> Result<Json<DocumentResponse>, ApiFailure> {
    if req.title.trim().is_empty() {
        return Err(ApiFailure::bad_request("Please provide a document title"));
    }

    let document = state
        .documents
        .create(NewDocument {
            title: req.title,
            content: req.content.unwrap_or_default(),
            user_id: Some(user.user_id),
        })
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to create document");
            ApiFailure::internal("Failed to create document")
        })?;

    Ok(Json(DocumentResponse {
        success: true,
        document,
    }))
}

/// List the caller's documents, most recently updated first.
#[utoipa::path(
    get,
    path = "/api/documents",
    responses(
        (status = 200, description = "Document list"),
        (status = 401, description = "Not authenticated", body = FailureBody)
    )
)]
pub async fn list_documents_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<DocumentListResponse>, ApiFailure> {
    let documents = state
        .documents
        .list(Some(&user.user_id))
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to fetch documents");
            ApiFailure::internal("Failed to fetch documents")
        })?;

    Ok(Json(DocumentListResponse {
        success: true,
        documents,
    }))
}

/// Fetch one document.
#[utoipa::path(
    get,
    path = "/api/documents/{id}",
    params(("id" = String, Path, description = "Document id")),
    responses(
        (status = 200, description = "The document"),
        (status = 401, description = "Not authenticated", body = FailureBody),
        (status = 404, description = "Unknown document id", body = FailureBody)
    )
)]
pub async fn get_document_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DocumentResponse>, ApiFailure> {
    let document = state
        .documents
        .get(&id)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to fetch document");
            ApiFailure::internal("Failed to fetch document")
        })?
        .ok_or_else(|| ApiFailure::not_found("Document not found"))?;

    Ok(Json(DocumentResponse {
        success: true,
        document,
    }))
}

/// Update a document's title and/or content. Only supplied fields change.
#[utoipa::path(
    put,
    path = "/api/documents/{id}",
    params(("id" = String, Path, description = "Document id")),
    request_body = UpdateDocumentRequest,
    responses(
        (status = 200, description = "The updated document"),
        (status = 400, description = "Empty title supplied", body = FailureBody),
        (status = 401, description = "Not authenticated", body = FailureBody),
        (status = 404, description = "Unknown document id", body = FailureBody)
    )
)]
pub async fn update_document_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateDocumentRequest>,
) -> Result<Json<DocumentResponse>, ApiFailure> {
    if matches!(&req.title, Some(title) if title.trim().is_empty()) {
        return Err(ApiFailure::bad_request("Please provide a document title"));
    }

    let document = state
        .documents
        .update(
            &id,
            DocumentPatch {
                title: req.title,
                content: req.content,
            },
        )
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to update document");
            ApiFailure::internal("Failed to update document")
        })?
        .ok_or_else(|| ApiFailure::not_found("Document not found"))?;

    Ok(Json(DocumentResponse {
        success: true,
        document,
    }))
}

/// Delete a document.
#[utoipa::path(
    delete,
    path = "/api/documents/{id}",
    params(("id" = String, Path, description = "Document id")),
    responses(
        (status = 200, description = "Deleted", body = DeleteResponse),
        (status = 401, description = "Not authenticated", body = FailureBody),
        (status = 404, description = "Unknown document id", body = FailureBody)
    )
)]
pub async fn delete_document_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiFailure> {
    let removed = state.documents.delete(&id).await.map_err(|e| {
        error!(error = %e, "Failed to delete document");
        ApiFailure::internal("Failed to delete document")
    })?;

    if !removed {
        return Err(ApiFailure::not_found("Document not found"));
    }

    Ok(Json(DeleteResponse {
        success: true,
        message: "Document deleted successfully".to_string(),
    }))
}
