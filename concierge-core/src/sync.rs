use async_trait::async_trait;
use concierge_catalog::{sync::project_record, SourceType};
use concierge_shared::models::events::ItemSyncEvent;
use std::sync::Arc;
use tracing::{debug, info};

use crate::outbox::EventPublisher;
use crate::repository::{KnowledgeRepository, RepoError};

/// The service that mirrors item events into the knowledge base.
///
/// Production deployments run it outside this workspace; the contract is:
/// one item-sourced record per item after an upsert, none after a delete.
#[async_trait]
pub trait KnowledgeSynchronizer: Send + Sync {
    async fn apply(&self, event: &ItemSyncEvent) -> Result<(), RepoError>;
}

/// Applies item events straight to a knowledge repository.
///
/// Used in memory mode and in tests in place of the external synchronizer.
pub struct KnowledgeSyncStub {
    knowledge: Arc<dyn KnowledgeRepository>,
}

impl KnowledgeSyncStub {
    pub fn new(knowledge: Arc<dyn KnowledgeRepository>) -> Self {
        Self { knowledge }
    }
}

#[async_trait]
impl KnowledgeSynchronizer for KnowledgeSyncStub {
    async fn apply(&self, event: &ItemSyncEvent) -> Result<(), RepoError> {
        match event {
            ItemSyncEvent::Upserted(e) => {
                let existing = self.knowledge.find_by_source(SourceType::Item, e.item_id).await?;
                let record = project_record(e, existing.first());

                // The looked-up record may be gone by the time the update lands
                if existing.is_empty() || !self.knowledge.update_record(&record).await? {
                    self.knowledge.insert_record(&record).await?;
                }
                for duplicate in existing.iter().skip(1) {
                    self.knowledge.delete_record(duplicate.id).await?;
                }

                debug!("Synced knowledge record {} for item {}", record.id, e.item_id);
            }
            ItemSyncEvent::Deleted(e) => {
                let removed = self.knowledge.delete_by_source(SourceType::Item, e.item_id).await?;
                info!("Removed {} knowledge record(s) for deleted item {}", removed, e.item_id);
            }
        }
        Ok(())
    }
}

#[async_trait]
impl EventPublisher for KnowledgeSyncStub {
    async fn publish(&self, _topic: &str, _key: &str, payload: &str) -> Result<(), RepoError> {
        let event: ItemSyncEvent = serde_json::from_str(payload)?;
        debug!("Applying {} for company {}", event.event_type(), event.company_id());
        self.apply(&event).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use crate::repository::KnowledgeFilter;
    use concierge_catalog::{sync, Item, ItemCategory, ItemDraft, KnowledgeRecord, PriceFormatter};
    use uuid::Uuid;

    #[tokio::test]
    async fn test_upsert_keeps_one_record_per_item() {
        let store = MemoryStore::new();
        let stub = KnowledgeSyncStub::new(Arc::new(store.clone()));
        let formatter = PriceFormatter::default();

        let mut item = Item::create(ItemDraft::new("acme", ItemCategory::Product, "Kaos")).unwrap();
        stub.apply(&sync::upserted(&item, &formatter)).await.unwrap();

        item.name = "Kaos Polos".to_string();
        stub.apply(&sync::upserted(&item, &formatter)).await.unwrap();

        let records = store.find_by_source(SourceType::Item, item.id).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Kaos Polos");
    }

    /// Answers source lookups with a record the store no longer holds.
    struct StaleLookup {
        store: MemoryStore,
        stale: KnowledgeRecord,
    }

    #[async_trait]
    impl KnowledgeRepository for StaleLookup {
        async fn insert_record(&self, record: &KnowledgeRecord) -> Result<(), RepoError> {
            self.store.insert_record(record).await
        }
        async fn update_record(&self, record: &KnowledgeRecord) -> Result<bool, RepoError> {
            self.store.update_record(record).await
        }
        async fn delete_record(&self, id: Uuid) -> Result<bool, RepoError> {
            self.store.delete_record(id).await
        }
        async fn get_record(&self, id: Uuid) -> Result<Option<KnowledgeRecord>, RepoError> {
            self.store.get_record(id).await
        }
        async fn list_records(&self, filter: &KnowledgeFilter) -> Result<Vec<KnowledgeRecord>, RepoError> {
            self.store.list_records(filter).await
        }
        async fn find_by_source(
            &self,
            _source_type: SourceType,
            _source_id: Uuid,
        ) -> Result<Vec<KnowledgeRecord>, RepoError> {
            Ok(vec![self.stale.clone()])
        }
        async fn delete_by_source(&self, source_type: SourceType, source_id: Uuid) -> Result<u64, RepoError> {
            self.store.delete_by_source(source_type, source_id).await
        }
    }

    #[tokio::test]
    async fn test_upsert_inserts_when_record_vanished() {
        let store = MemoryStore::new();
        let formatter = PriceFormatter::default();
        let item = Item::create(ItemDraft::new("acme", ItemCategory::Product, "Kaos")).unwrap();

        let event = sync::upserted(&item, &formatter);
        let ItemSyncEvent::Upserted(ref payload) = event else { unreachable!() };
        let stale = sync::project_record(payload, None);

        let stub = KnowledgeSyncStub::new(Arc::new(StaleLookup { store: store.clone(), stale }));
        stub.apply(&event).await.unwrap();

        let records = store.find_by_source(SourceType::Item, item.id).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Kaos");
    }

    #[tokio::test]
    async fn test_delete_removes_mirrored_record() {
        let store = MemoryStore::new();
        let stub = KnowledgeSyncStub::new(Arc::new(store.clone()));

        let item = Item::create(ItemDraft::new("acme", ItemCategory::Product, "Kaos")).unwrap();
        stub.apply(&sync::upserted(&item, &PriceFormatter::default())).await.unwrap();
        stub.apply(&sync::deleted(&item)).await.unwrap();

        let records = store.list_records(&KnowledgeFilter::default()).await.unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_publish_decodes_payload() {
        let store = MemoryStore::new();
        let stub = KnowledgeSyncStub::new(Arc::new(store.clone()));

        let item = Item::create(ItemDraft::new("acme", ItemCategory::Tour, "Bromo")).unwrap();
        let payload = serde_json::to_string(&sync::upserted(&item, &PriceFormatter::default())).unwrap();
        stub.publish("catalog.item_sync", &item.id.to_string(), &payload).await.unwrap();

        assert_eq!(store.find_by_source(SourceType::Item, item.id).await.unwrap().len(), 1);
        assert!(stub.publish("t", "k", "not json").await.is_err());
    }
}
