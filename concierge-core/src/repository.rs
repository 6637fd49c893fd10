use async_trait::async_trait;
use concierge_catalog::{Item, ItemCategory, KnowledgeRecord, SourceType};
use serde::Deserialize;
use uuid::Uuid;

use crate::outbox::OutboxMessage;

pub type RepoError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemFilter {
    pub company_id: Option<String>,
    #[serde(alias = "item_type")]
    pub category: Option<ItemCategory>,
}

impl ItemFilter {
    pub fn matches(&self, item: &Item) -> bool {
        self.company_id.as_deref().map_or(true, |c| c == item.company_id)
            && self.category.map_or(true, |c| c == item.category)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct KnowledgeFilter {
    pub company_id: Option<String>,
    pub source_type: Option<SourceType>,
}

impl KnowledgeFilter {
    pub fn matches(&self, record: &KnowledgeRecord) -> bool {
        self.company_id.as_deref().map_or(true, |c| c == record.company_id)
            && self.source_type.map_or(true, |s| s == record.source_type)
    }
}

/// Repository trait for items.
///
/// Every write takes the outbox message describing it; implementations
/// must persist both atomically.
#[async_trait]
pub trait ItemRepository: Send + Sync {
    async fn insert_item(&self, item: &Item, outbox: &OutboxMessage) -> Result<(), RepoError>;

    /// Returns `false` when no item with that id exists.
    async fn update_item(&self, item: &Item, outbox: &OutboxMessage) -> Result<bool, RepoError>;

    /// Returns `false` when no item with that id exists.
    async fn delete_item(&self, id: Uuid, outbox: &OutboxMessage) -> Result<bool, RepoError>;

    async fn get_item(&self, id: Uuid) -> Result<Option<Item>, RepoError>;

    /// Matching items ordered by name.
    async fn list_items(&self, filter: &ItemFilter) -> Result<Vec<Item>, RepoError>;
}

/// Repository trait for knowledge base records
#[async_trait]
pub trait KnowledgeRepository: Send + Sync {
    async fn insert_record(&self, record: &KnowledgeRecord) -> Result<(), RepoError>;

    async fn update_record(&self, record: &KnowledgeRecord) -> Result<bool, RepoError>;

    async fn delete_record(&self, id: Uuid) -> Result<bool, RepoError>;

    async fn get_record(&self, id: Uuid) -> Result<Option<KnowledgeRecord>, RepoError>;

    /// Matching records, highest priority first.
    async fn list_records(&self, filter: &KnowledgeFilter) -> Result<Vec<KnowledgeRecord>, RepoError>;

    async fn find_by_source(
        &self,
        source_type: SourceType,
        source_id: Uuid,
    ) -> Result<Vec<KnowledgeRecord>, RepoError>;

    /// Returns the number of records removed.
    async fn delete_by_source(&self, source_type: SourceType, source_id: Uuid) -> Result<u64, RepoError>;
}

/// Repository trait for the sync outbox
#[async_trait]
pub trait OutboxRepository: Send + Sync {
    /// Unpublished messages in write order.
    async fn fetch_pending(&self, limit: usize) -> Result<Vec<OutboxMessage>, RepoError>;

    async fn mark_published(&self, ids: &[Uuid]) -> Result<(), RepoError>;
}
