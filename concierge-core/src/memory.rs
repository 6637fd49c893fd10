use async_trait::async_trait;
use chrono::Utc;
use concierge_catalog::{Item, KnowledgeRecord, SourceType};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::outbox::OutboxMessage;
use crate::repository::{
    ItemFilter, ItemRepository, KnowledgeFilter, KnowledgeRepository, OutboxRepository, RepoError,
};

#[derive(Default)]
struct State {
    items: HashMap<Uuid, Item>,
    knowledge: HashMap<Uuid, KnowledgeRecord>,
    outbox: Vec<OutboxMessage>,
}

/// In-process store for development and tests.
///
/// All tables sit behind one lock, so an item write and its outbox message
/// land together the way a database transaction would.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn pending_outbox(&self) -> Vec<OutboxMessage> {
        let state = self.state.read().await;
        state
            .outbox
            .iter()
            .filter(|m| m.published_at.is_none())
            .cloned()
            .collect()
    }
}

#[async_trait]
impl ItemRepository for MemoryStore {
    async fn insert_item(&self, item: &Item, outbox: &OutboxMessage) -> Result<(), RepoError> {
        let mut state = self.state.write().await;
        if state.items.contains_key(&item.id) {
            return Err(format!("duplicate item id {}", item.id).into());
        }
        state.items.insert(item.id, item.clone());
        state.outbox.push(outbox.clone());
        Ok(())
    }

    async fn update_item(&self, item: &Item, outbox: &OutboxMessage) -> Result<bool, RepoError> {
        let mut state = self.state.write().await;
        match state.items.get_mut(&item.id) {
            Some(existing) => {
                *existing = item.clone();
                state.outbox.push(outbox.clone());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_item(&self, id: Uuid, outbox: &OutboxMessage) -> Result<bool, RepoError> {
        let mut state = self.state.write().await;
        if state.items.remove(&id).is_none() {
            return Ok(false);
        }
        state.outbox.push(outbox.clone());
        Ok(true)
    }

    async fn get_item(&self, id: Uuid) -> Result<Option<Item>, RepoError> {
        Ok(self.state.read().await.items.get(&id).cloned())
    }

    async fn list_items(&self, filter: &ItemFilter) -> Result<Vec<Item>, RepoError> {
        let state = self.state.read().await;
        let mut items: Vec<Item> = state
            .items
            .values()
            .filter(|i| filter.matches(i))
            .cloned()
            .collect();
        items.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(items)
    }
}

#[async_trait]
impl KnowledgeRepository for MemoryStore {
    async fn insert_record(&self, record: &KnowledgeRecord) -> Result<(), RepoError> {
        let mut state = self.state.write().await;
        if state.knowledge.contains_key(&record.id) {
            return Err(format!("duplicate knowledge id {}", record.id).into());
        }
        state.knowledge.insert(record.id, record.clone());
        Ok(())
    }

    async fn update_record(&self, record: &KnowledgeRecord) -> Result<bool, RepoError> {
        let mut state = self.state.write().await;
        match state.knowledge.get_mut(&record.id) {
            Some(existing) => {
                *existing = record.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_record(&self, id: Uuid) -> Result<bool, RepoError> {
        Ok(self.state.write().await.knowledge.remove(&id).is_some())
    }

    async fn get_record(&self, id: Uuid) -> Result<Option<KnowledgeRecord>, RepoError> {
        Ok(self.state.read().await.knowledge.get(&id).cloned())
    }

    async fn list_records(&self, filter: &KnowledgeFilter) -> Result<Vec<KnowledgeRecord>, RepoError> {
        let state = self.state.read().await;
        let mut records: Vec<KnowledgeRecord> = state
            .knowledge
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        records.sort_by(|a, b| b.priority.cmp(&a.priority).then(a.title.cmp(&b.title)));
        Ok(records)
    }

    async fn find_by_source(
        &self,
        source_type: SourceType,
        source_id: Uuid,
    ) -> Result<Vec<KnowledgeRecord>, RepoError> {
        let state = self.state.read().await;
        let mut records: Vec<KnowledgeRecord> = state
            .knowledge
            .values()
            .filter(|r| r.source_type == source_type && r.source_id == Some(source_id))
            .cloned()
            .collect();
        records.sort_by_key(|r| r.created_at);
        Ok(records)
    }

    async fn delete_by_source(&self, source_type: SourceType, source_id: Uuid) -> Result<u64, RepoError> {
        let mut state = self.state.write().await;
        let before = state.knowledge.len();
        state
            .knowledge
            .retain(|_, r| !(r.source_type == source_type && r.source_id == Some(source_id)));
        Ok((before - state.knowledge.len()) as u64)
    }
}

#[async_trait]
impl OutboxRepository for MemoryStore {
    async fn fetch_pending(&self, limit: usize) -> Result<Vec<OutboxMessage>, RepoError> {
        let state = self.state.read().await;
        Ok(state
            .outbox
            .iter()
            .filter(|m| m.published_at.is_none())
            .take(limit)
            .cloned()
            .collect())
    }

    async fn mark_published(&self, ids: &[Uuid]) -> Result<(), RepoError> {
        let mut state = self.state.write().await;
        let now = Utc::now();
        for message in state.outbox.iter_mut().filter(|m| ids.contains(&m.id)) {
            message.published_at = Some(now);
        }
        Ok(())
    }
}
