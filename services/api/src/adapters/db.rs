//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, the concrete implementation of
//! the storage ports backed by PostgreSQL through `sqlx`. It is selected at
//! startup when a `DATABASE_URL` is configured.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use promptdesk_core::domain::{
    ChatMessage, Conversation, ConversationStep, Document, DocumentPatch, NewDocument,
};
use promptdesk_core::models::ModelId;
use promptdesk_core::ports::{ConversationStore, DocumentStore, PortError, PortResult};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `ConversationStore` and
/// `DocumentStore` ports.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Creates a new `PgStore`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

fn step_to_db(step: ConversationStep) -> &'static str {
    match step {
        ConversationStep::Chatting => "chatting",
        ConversationStep::Completed => "completed",
    }
}

fn step_from_db(value: &str) -> ConversationStep {
    match value {
        "completed" => ConversationStep::Completed,
        _ => ConversationStep::Chatting,
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct ConversationRecord {
    id: String,
    current_step: String,
    initial_description: String,
    selected_model: String,
    conversation_history: Json<Vec<ChatMessage>>,
    user_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ConversationRecord {
    fn to_domain(self) -> PortResult<Conversation> {
        let selected_model: ModelId = self
            .selected_model
            .parse()
            .map_err(|e: promptdesk_core::models::UnknownModel| {
                PortError::Unexpected(e.to_string())
            })?;
        Ok(Conversation {
            id: self.id,
            current_step: step_from_db(&self.current_step),
            initial_description: self.initial_description,
            selected_model,
            conversation_history: self.conversation_history.0,
            user_id: self.user_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(FromRow)]
struct DocumentRecord {
    id: Uuid,
    title: String,
    content: String,
    user_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl DocumentRecord {
    fn to_domain(self) -> Document {
        Document {
            id: self.id.to_string(),
            title: self.title,
            content: self.content,
            user_id: self.user_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

//=========================================================================================
// `ConversationStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl ConversationStore for PgStore {
    async fn get(&self, id: &str) -> PortResult<Option<Conversation>> {
        let record = sqlx::query_as::<_, ConversationRecord>(
            "SELECT id, current_step, initial_description, selected_model, \
             conversation_history, user_id, created_at, updated_at \
             FROM conversations WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;

        record.map(ConversationRecord::to_domain).transpose()
    }

    async fn save(&self, conversation: Conversation) -> PortResult<Conversation> {
        let record = sqlx::query_as::<_, ConversationRecord>(
            "INSERT INTO conversations \
             (id, current_step, initial_description, selected_model, conversation_history, user_id, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, now()) \
             ON CONFLICT (id) DO UPDATE SET \
               current_step = EXCLUDED.current_step, \
               selected_model = EXCLUDED.selected_model, \
               conversation_history = EXCLUDED.conversation_history, \
               user_id = EXCLUDED.user_id, \
               updated_at = now() \
             RETURNING id, current_step, initial_description, selected_model, \
               conversation_history, user_id, created_at, updated_at",
        )
        .bind(&conversation.id)
        .bind(step_to_db(conversation.current_step))
        .bind(&conversation.initial_description)
        .bind(conversation.selected_model.as_str())
        .bind(Json(&conversation.conversation_history))
        .bind(&conversation.user_id)
        .bind(conversation.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;

        record.to_domain()
    }

    async fn list(&self, owner: Option<&str>) -> PortResult<Vec<Conversation>> {
        let records = match owner {
            Some(owner) => {
                sqlx::query_as::<_, ConversationRecord>(
                    "SELECT id, current_step, initial_description, selected_model, \
                     conversation_history, user_id, created_at, updated_at \
                     FROM conversations WHERE user_id = $1 ORDER BY updated_at DESC",
                )
                .bind(owner)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as::<_, ConversationRecord>(
                    "SELECT id, current_step, initial_description, selected_model, \
                     conversation_history, user_id, created_at, updated_at \
                     FROM conversations ORDER BY updated_at DESC",
                )
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(unexpected)?;

        records
            .into_iter()
            .map(ConversationRecord::to_domain)
            .collect()
    }

    async fn delete(&self, id: &str) -> PortResult<bool> {
        let result = sqlx::query("DELETE FROM conversations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(result.rows_affected() > 0)
    }
}

//=========================================================================================
// `DocumentStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl DocumentStore for PgStore {
    async fn create(&self, document: NewDocument) -> PortResult<Document> {
        let record = sqlx::query_as::<_, DocumentRecord>(
            "INSERT INTO documents (title, content, user_id) VALUES ($1, $2, $3) \
             RETURNING id, title, content, user_id, created_at, updated_at",
        )
        .bind(&document.title)
        .bind(&document.content)
        .bind(&document.user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(record.to_domain())
    }

    async fn get(&self, id: &str) -> PortResult<Option<Document>> {
        // A non-uuid id cannot exist in this backend.
        let Ok(id) = Uuid::parse_str(id) else {
            return Ok(None);
        };
        let record = sqlx::query_as::<_, DocumentRecord>(
            "SELECT id, title, content, user_id, created_at, updated_at \
             FROM documents WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(record.map(DocumentRecord::to_domain))
    }

    async fn list(&self, owner: Option<&str>) -> PortResult<Vec<Document>> {
        let records = match owner {
            Some(owner) => {
                sqlx::query_as::<_, DocumentRecord>(
                    "SELECT id, title, content, user_id, created_at, updated_at \
                     FROM documents WHERE user_id = $1 ORDER BY updated_at DESC",
                )
                .bind(owner)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as::<_, DocumentRecord>(
                    "SELECT id, title, content, user_id, created_at, updated_at \
                     FROM documents ORDER BY updated_at DESC",
                )
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(unexpected)?;

        Ok(records.into_iter().map(DocumentRecord::to_domain).collect())
    }

    async fn update(&self, id: &str, patch: DocumentPatch) -> PortResult<Option<Document>> {
        let Ok(id) = Uuid::parse_str(id) else {
            return Ok(None);
        };
        let record = sqlx::query_as::<_, DocumentRecord>(
            "UPDATE documents SET \
               title = COALESCE($2, title), \
               content = COALESCE($3, content), \
               updated_at = now() \
             WHERE id = $1 \
             RETURNING id, title, content, user_id, created_at, updated_at",
        )
        .bind(id)
        .bind(&patch.title)
        .bind(&patch.content)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(record.map(DocumentRecord::to_domain))
    }

    async fn delete(&self, id: &str) -> PortResult<bool> {
        let Ok(id) = Uuid::parse_str(id) else {
            return Ok(false);
        };
        let result = sqlx::query("DELETE FROM documents WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(result.rows_affected() > 0)
    }
}
