use concierge_catalog::{
    resolve, sync, EditTarget, Item, ItemCategory, ItemDraft, ItemStats, KnowledgeDraft,
    KnowledgeRecord, KnowledgeStats, PriceFormatter, Pricing, PricingInput,
};
use concierge_shared::models::events::ItemSyncEvent;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::outbox::OutboxMessage;
use crate::repository::{ItemFilter, ItemRepository, KnowledgeFilter, KnowledgeRepository};
use crate::{CoreError, CoreResult};

/// Resolved pricing for an unsaved form.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PricingPreview {
    pub kind: &'static str,
    pub pricing: Pricing,
    pub display: String,
    pub warnings: Vec<String>,
}

/// Item and knowledge operations behind the admin API.
pub struct CatalogService {
    items: Arc<dyn ItemRepository>,
    knowledge: Arc<dyn KnowledgeRepository>,
    formatter: PriceFormatter,
}

impl CatalogService {
    pub fn new(
        items: Arc<dyn ItemRepository>,
        knowledge: Arc<dyn KnowledgeRepository>,
        formatter: PriceFormatter,
    ) -> Self {
        Self { items, knowledge, formatter }
    }

    pub fn formatter(&self) -> &PriceFormatter {
        &self.formatter
    }

    pub fn preview_pricing(&self, category: ItemCategory, input: &PricingInput) -> PricingPreview {
        let pricing = resolve(category, input);
        PricingPreview {
            kind: pricing.kind(),
            display: self.formatter.format(&pricing),
            warnings: pricing.warnings().iter().map(ToString::to_string).collect(),
            pricing,
        }
    }

    // ------------------------------------------------------------------
    // Items
    // ------------------------------------------------------------------

    pub async fn create_item(&self, draft: ItemDraft) -> CoreResult<Item> {
        let item = Item::create(draft)?;
        let message = self.outbox_message(&sync::upserted(&item, &self.formatter))?;

        self.items.insert_item(&item, &message).await?;
        info!("Created item {} ({}) for company {}", item.id, item.category, item.company_id);
        Ok(item)
    }

    pub async fn get_item(&self, id: Uuid) -> CoreResult<Item> {
        self.items
            .get_item(id)
            .await?
            .ok_or(CoreError::NotFound { kind: "Item", id })
    }

    pub async fn list_items(&self, filter: &ItemFilter) -> CoreResult<(Vec<Item>, ItemStats)> {
        let items = self.items.list_items(filter).await?;
        let stats = ItemStats::from_items(&items);
        Ok((items, stats))
    }

    /// Last write wins; there is no version check.
    pub async fn update_item(&self, id: Uuid, draft: ItemDraft) -> CoreResult<Item> {
        let mut item = self.get_item(id).await?;
        item.apply(draft)?;
        self.save_item(&item).await?;
        info!("Updated item {}", item.id);
        Ok(item)
    }

    pub async fn toggle_featured(&self, id: Uuid) -> CoreResult<Item> {
        let mut item = self.get_item(id).await?;
        item.is_featured = !item.is_featured;
        item.updated_at = chrono::Utc::now();
        self.save_item(&item).await?;
        Ok(item)
    }

    /// Deletes the item; its knowledge record goes with it through the sync event.
    pub async fn delete_item(&self, id: Uuid) -> CoreResult<Item> {
        let item = self.get_item(id).await?;
        let message = self.outbox_message(&sync::deleted(&item))?;

        if !self.items.delete_item(id, &message).await? {
            return Err(CoreError::NotFound { kind: "Item", id });
        }
        info!("Deleted item {}; knowledge removal queued", id);
        Ok(item)
    }

    async fn save_item(&self, item: &Item) -> CoreResult<()> {
        let message = self.outbox_message(&sync::upserted(item, &self.formatter))?;
        if !self.items.update_item(item, &message).await? {
            return Err(CoreError::NotFound { kind: "Item", id: item.id });
        }
        Ok(())
    }

    fn outbox_message(&self, event: &ItemSyncEvent) -> CoreResult<OutboxMessage> {
        OutboxMessage::from_event(event).map_err(|e| CoreError::InternalError(e.to_string()))
    }

    // ------------------------------------------------------------------
    // Knowledge base
    // ------------------------------------------------------------------

    pub async fn create_knowledge(&self, draft: KnowledgeDraft) -> CoreResult<KnowledgeRecord> {
        let record = KnowledgeRecord::create(draft)?;
        self.knowledge.insert_record(&record).await?;
        info!("Created {} knowledge record {}", record.source_type, record.id);
        Ok(record)
    }

    pub async fn get_knowledge(&self, id: Uuid) -> CoreResult<KnowledgeRecord> {
        self.knowledge
            .get_record(id)
            .await?
            .ok_or(CoreError::NotFound { kind: "Knowledge record", id })
    }

    pub async fn list_knowledge(
        &self,
        filter: &KnowledgeFilter,
    ) -> CoreResult<(Vec<KnowledgeRecord>, KnowledgeStats)> {
        let records = self.knowledge.list_records(filter).await?;
        let stats = KnowledgeStats::from_records(&records);
        Ok((records, stats))
    }

    pub async fn update_knowledge(&self, id: Uuid, draft: KnowledgeDraft) -> CoreResult<KnowledgeRecord> {
        let mut record = self.get_knowledge(id).await?;
        if let Err(e) = record.apply(draft) {
            warn!("Rejected knowledge update {}: {}", id, e);
            return Err(e.into());
        }

        if !self.knowledge.update_record(&record).await? {
            return Err(CoreError::NotFound { kind: "Knowledge record", id });
        }
        Ok(record)
    }

    pub async fn delete_knowledge(&self, id: Uuid) -> CoreResult<()> {
        let record = self.get_knowledge(id).await?;
        if let Err(e) = record.ensure_mutable() {
            warn!("Rejected knowledge delete {}: {}", id, e);
            return Err(e.into());
        }

        if !self.knowledge.delete_record(id).await? {
            return Err(CoreError::NotFound { kind: "Knowledge record", id });
        }
        info!("Deleted knowledge record {}", id);
        Ok(())
    }

    pub async fn knowledge_edit_target(&self, id: Uuid) -> CoreResult<EditTarget> {
        Ok(self.get_knowledge(id).await?.edit_target())
    }
}
