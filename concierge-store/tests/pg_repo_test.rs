//! Runs against a live Postgres when `DATABASE_URL` is set; otherwise each test returns early.

use concierge_catalog::{ItemCategory, ItemDraft, KnowledgeDraft, PriceFormatter, SourceType};
use concierge_core::outbox::OutboxRelay;
use concierge_core::repository::KnowledgeRepository;
use concierge_core::sync::KnowledgeSyncStub;
use concierge_core::CatalogService;
use concierge_store::{DbClient, PgItemRepository, PgKnowledgeRepository, PgOutboxRepository};
use std::sync::Arc;

struct PgHarness {
    knowledge: Arc<PgKnowledgeRepository>,
    service: CatalogService,
    relay: OutboxRelay,
}

async fn harness() -> Option<PgHarness> {
    let url = std::env::var("DATABASE_URL").ok()?;
    let db = DbClient::new(&url, 2).await.unwrap();
    db.migrate().await.unwrap();

    let items = Arc::new(PgItemRepository::new(db.pool.clone()));
    let knowledge = Arc::new(PgKnowledgeRepository::new(db.pool.clone()));
    let outbox = Arc::new(PgOutboxRepository::new(db.pool));
    let stub = Arc::new(KnowledgeSyncStub::new(knowledge.clone()));

    Some(PgHarness {
        service: CatalogService::new(items, knowledge.clone(), PriceFormatter::default()),
        relay: OutboxRelay::new(outbox, stub, 100),
        knowledge,
    })
}

#[tokio::test]
async fn test_knowledge_update_moves_company() {
    let Some(h) = harness().await else { return };

    let record = h
        .service
        .create_knowledge(KnowledgeDraft::new("acme", "Jam buka", "08.00-17.00"))
        .await
        .unwrap();
    h.service
        .update_knowledge(record.id, KnowledgeDraft::new("globex", "Jam buka", "09.00-18.00"))
        .await
        .unwrap();

    let stored = h.service.get_knowledge(record.id).await.unwrap();
    assert_eq!(stored.company_id, "globex");
    assert_eq!(stored.content, "09.00-18.00");

    h.service.delete_knowledge(record.id).await.unwrap();
}

#[tokio::test]
async fn test_item_move_reaches_mirrored_record() {
    let Some(h) = harness().await else { return };

    let mut draft = ItemDraft::new("acme", ItemCategory::Vehicle, "Toyota Avanza");
    draft.pricing.daily = Some(150000);
    let item = h.service.create_item(draft.clone()).await.unwrap();
    h.relay.run_once().await.unwrap();

    draft.company_id = "globex".to_string();
    h.service.update_item(item.id, draft).await.unwrap();
    h.relay.run_once().await.unwrap();

    assert_eq!(h.service.get_item(item.id).await.unwrap().company_id, "globex");
    let mirrored = h.knowledge.find_by_source(SourceType::Item, item.id).await.unwrap();
    assert_eq!(mirrored.len(), 1);
    assert_eq!(mirrored[0].company_id, "globex");

    h.service.delete_item(item.id).await.unwrap();
    h.relay.run_once().await.unwrap();
}
