//! services/api/src/adapters/memory.rs
//!
//! In-memory implementation of the storage ports, used when no database is
//! configured. Data lives for the lifetime of the process only.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use promptdesk_core::domain::{Conversation, Document, DocumentPatch, NewDocument};
use promptdesk_core::ports::{ConversationStore, DocumentStore, PortResult};
use tokio::sync::RwLock;

/// A process-local store backing both collections. Access goes through the
/// port traits only; concurrent writes to the same id are last-write-wins.
#[derive(Default)]
pub struct MemoryStore {
    conversations: RwLock<HashMap<String, Conversation>>,
    documents: RwLock<HashMap<String, Document>>,
    next_document_id: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConversationStore for MemoryStore {
    async fn get(&self, id: &str) -> PortResult<Option<Conversation>> {
        Ok(self.conversations.read().await.get(id).cloned())
    }

    async fn save(&self, mut conversation: Conversation) -> PortResult<Conversation> {
        let mut map = self.conversations.write().await;
        if let Some(existing) = map.get(&conversation.id) {
            conversation.created_at = existing.created_at;
        }
        conversation.updated_at = Utc::now();
        map.insert(conversation.id.clone(), conversation.clone());
        Ok(conversation)
    }

    async fn list(&self, owner: Option<&str>) -> PortResult<Vec<Conversation>> {
        let map = self.conversations.read().await;
        let mut conversations: Vec<Conversation> = map
            .values()
            .filter(|c| match owner {
                Some(owner) => c.user_id.as_deref() == Some(owner),
                None => true,
            })
            .cloned()
            .collect();
        // The millis portion of the generated id stands in for a creation
        // timestamp; an approximation, not a guaranteed-accurate ordering.
        conversations.sort_by_key(|c| std::cmp::Reverse(c.id_timestamp_millis()));
        Ok(conversations)
    }

    async fn delete(&self, id: &str) -> PortResult<bool> {
        Ok(self.conversations.write().await.remove(id).is_some())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn create(&self, document: NewDocument) -> PortResult<Document> {
        let id = self.next_document_id.fetch_add(1, Ordering::Relaxed) + 1;
        let now = Utc::now();
        let document = Document {
            id: id.to_string(),
            title: document.title,
            content: document.content,
            user_id: document.user_id,
            created_at: now,
            updated_at: now,
        };
        self.documents
            .write()
            .await
            .insert(document.id.clone(), document.clone());
        Ok(document)
    }

    async fn get(&self, id: &str) -> PortResult<Option<Document>> {
        Ok(self.documents.read().await.get(id).cloned())
    }

    async fn list(&self, owner: Option<&str>) -> PortResult<Vec<Document>> {
        let map = self.documents.read().await;
        let mut documents: Vec<Document> = map
            .values()
            .filter(|d| match owner {
                Some(owner) => d.user_id.as_deref() == Some(owner),
                None => true,
            })
            .cloned()
            .collect();
        documents.sort_by_key(|d| std::cmp::Reverse(d.updated_at));
        Ok(documents)
    }

    async fn update(&self, id: &str, patch: DocumentPatch) -> PortResult<Option<Document>> {
        let mut map = self.documents.write().await;
        let Some(existing) = map.get_mut(id) else {
            return Ok(None);
        };
        if let Some(title) = patch.title {
            existing.title = title;
        }
        if let Some(content) = patch.content {
            existing.content = content;
        }
        existing.updated_at = Utc::now();
        Ok(Some(existing.clone()))
    }

    async fn delete(&self, id: &str) -> PortResult<bool> {
        Ok(self.documents.write().await.remove(id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use promptdesk_core::domain::ChatMessage;
    use promptdesk_core::models::ModelId;
    use std::time::Duration;

    fn new_document(title: &str, user_id: Option<&str>) -> NewDocument {
        NewDocument {
            title: title.to_string(),
            content: String::new(),
            user_id: user_id.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn save_is_an_upsert_that_refreshes_updated_at() {
        let store = MemoryStore::new();
        let mut conversation = Conversation::new("hello", ModelId::Gpt4o, None);
        let saved = ConversationStore::save(&store, conversation.clone())
            .await
            .unwrap();
        let first_update = saved.updated_at;

        tokio::time::sleep(Duration::from_millis(5)).await;
        conversation
            .conversation_history
            .push(ChatMessage::user("hello", Some(ModelId::Gpt4o)));
        conversation
            .conversation_history
            .push(ChatMessage::assistant("hi there", Some(ModelId::Gpt4o)));
        let resaved = ConversationStore::save(&store, conversation).await.unwrap();

        assert!(resaved.updated_at > first_update);
        assert_eq!(resaved.created_at, saved.created_at);
        let fetched = ConversationStore::get(&store, &resaved.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched.conversation_history.len(), 2);
    }

    #[tokio::test]
    async fn owner_filter_excludes_unowned_records() {
        let store = MemoryStore::new();
        ConversationStore::save(
            &store,
            Conversation::new("mine", ModelId::Gpt4o, Some("user_a".to_string())),
        )
        .await
        .unwrap();
        ConversationStore::save(&store, Conversation::new("nobody's", ModelId::Gpt4o, None))
            .await
            .unwrap();

        let mine = ConversationStore::list(&store, Some("user_a")).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].initial_description, "mine");

        let theirs = ConversationStore::list(&store, Some("user_b")).await.unwrap();
        assert!(theirs.is_empty());

        // Unfiltered listings still see unowned records.
        let all = ConversationStore::list(&store, None).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn conversations_list_most_recent_first() {
        let store = MemoryStore::new();
        let older = Conversation::new("first", ModelId::Gpt4o, None);
        tokio::time::sleep(Duration::from_millis(5)).await;
        let newer = Conversation::new("second", ModelId::Gpt4o, None);
        ConversationStore::save(&store, older).await.unwrap();
        ConversationStore::save(&store, newer).await.unwrap();

        let listed = ConversationStore::list(&store, None).await.unwrap();
        assert_eq!(listed[0].initial_description, "second");
        assert_eq!(listed[1].initial_description, "first");
    }

    #[tokio::test]
    async fn document_patch_applies_only_supplied_fields() {
        let store = MemoryStore::new();
        let created = store.create(new_document("Notes", Some("user_a"))).await.unwrap();
        assert_eq!(created.content, "");

        tokio::time::sleep(Duration::from_millis(5)).await;
        let patched = store
            .update(
                &created.id,
                DocumentPatch {
                    title: None,
                    content: Some("hi".to_string()),
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(patched.title, "Notes");
        assert_eq!(patched.content, "hi");
        assert!(patched.updated_at > created.updated_at);
    }

    #[tokio::test]
    async fn update_of_unknown_document_is_not_found() {
        let store = MemoryStore::new();
        let patched = store
            .update("999", DocumentPatch::default())
            .await
            .unwrap();
        assert!(patched.is_none());
    }

    #[tokio::test]
    async fn delete_reports_whether_a_record_existed() {
        let store = MemoryStore::new();
        let created = store.create(new_document("Notes", None)).await.unwrap();

        assert!(DocumentStore::delete(&store, &created.id).await.unwrap());
        assert!(DocumentStore::get(&store, &created.id).await.unwrap().is_none());
        assert!(!DocumentStore::delete(&store, &created.id).await.unwrap());
    }

    #[tokio::test]
    async fn memory_document_ids_are_sequential() {
        let store = MemoryStore::new();
        let a = store.create(new_document("a", None)).await.unwrap();
        let b = store.create(new_document("b", None)).await.unwrap();
        assert_eq!(a.id, "1");
        assert_eq!(b.id, "2");
    }
}
