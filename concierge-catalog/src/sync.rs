//! Knowledge sync contract.
//!
//! Every item write produces an [`ItemSyncEvent`]. The synchronizer keeps
//! exactly one knowledge record per item, keyed by
//! `(source_type = item, source_id = item.id)`, and removes it when the item
//! is deleted.

use chrono::Utc;
use concierge_shared::models::events::{ItemDeletedEvent, ItemSyncEvent, ItemUpsertedEvent};
use uuid::Uuid;

use crate::format::PriceFormatter;
use crate::item::Item;
use crate::knowledge::{KnowledgeRecord, SourceType, DEFAULT_PRIORITY};
use crate::pricing::Pricing;

pub const FEATURED_PRIORITY: i32 = 8;

pub fn upserted(item: &Item, formatter: &PriceFormatter) -> ItemSyncEvent {
    ItemSyncEvent::Upserted(ItemUpsertedEvent {
        item_id: item.id,
        company_id: item.company_id.clone(),
        title: item.name.clone(),
        content: render_content(item, formatter),
        category: item.category.knowledge_category().to_string(),
        tags: [item.category.as_str(), item.slug.as_str()]
            .into_iter()
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect(),
        priority: if item.is_featured { FEATURED_PRIORITY } else { DEFAULT_PRIORITY },
        is_active: item.is_active,
        timestamp: Utc::now().timestamp(),
    })
}

pub fn deleted(item: &Item) -> ItemSyncEvent {
    ItemSyncEvent::Deleted(ItemDeletedEvent {
        item_id: item.id,
        company_id: item.company_id.clone(),
        timestamp: Utc::now().timestamp(),
    })
}

/// Natural-language article body for an item.
pub fn render_content(item: &Item, formatter: &PriceFormatter) -> String {
    let mut lines = vec![format!("{} ({})", item.name, item.category)];

    if let Some(short) = &item.short_description {
        lines.push(short.clone());
    }
    if let Some(description) = &item.description {
        lines.push(description.clone());
    }

    lines.push(format!("Price: {}", formatter.format(&item.pricing)));

    match &item.pricing {
        Pricing::Simple { compare_price: Some(compare_price), .. } if *compare_price != 0 => {
            lines.push(format!("Original price: {}", formatter.currency(*compare_price)));
        }
        Pricing::Duration { weekly, monthly, deposit, .. } => {
            if let Some(weekly) = weekly {
                lines.push(format!("Weekly rate: {}", formatter.currency(*weekly)));
            }
            if let Some(monthly) = monthly {
                lines.push(format!("Monthly rate: {}", formatter.currency(*monthly)));
            }
            if let Some(deposit) = deposit {
                lines.push(format!("Deposit: {}", formatter.currency(*deposit)));
            }
        }
        Pricing::DayType { .. } => {
            if let Some(weekend) = item.pricing.weekend_rate() {
                lines.push(format!("Weekend rate: {}", formatter.currency(weekend)));
            }
        }
        Pricing::PerHead { .. } => {
            if let Some(min_pax) = item.pricing.effective_min_pax() {
                lines.push(format!("Minimum participants: {}", min_pax));
            }
        }
        _ => {}
    }

    if !item.is_active {
        lines.push("Currently unavailable.".to_string());
    }

    lines.join("\n")
}

/// Knowledge record the synchronizer should hold after an upsert.
///
/// `existing` is the record already mirrored for the item, if any; its id
/// and creation time are kept so the item never gains a second record.
pub fn project_record(event: &ItemUpsertedEvent, existing: Option<&KnowledgeRecord>) -> KnowledgeRecord {
    let now = Utc::now();

    KnowledgeRecord {
        id: existing.map(|r| r.id).unwrap_or_else(Uuid::new_v4),
        company_id: event.company_id.clone(),
        title: event.title.clone(),
        content: event.content.clone(),
        category: event.category.clone(),
        tags: event.tags.clone(),
        priority: event.priority,
        source_type: SourceType::Item,
        source_id: Some(event.item_id),
        is_active: event.is_active,
        created_at: existing.map(|r| r.created_at).unwrap_or(now),
        updated_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{ItemCategory, ItemDraft};

    fn vehicle() -> Item {
        let mut draft = ItemDraft::new("rental-jaya", ItemCategory::Vehicle, "Toyota Avanza");
        draft.short_description = Some("7 seater, manual".to_string());
        draft.pricing.daily = Some(150000);
        draft.pricing.weekly = Some(900000);
        Item::create(draft).unwrap()
    }

    #[test]
    fn test_upserted_event() {
        let item = vehicle();
        let event = upserted(&item, &PriceFormatter::default());

        let ItemSyncEvent::Upserted(e) = event else {
            panic!("expected upsert");
        };
        assert_eq!(e.item_id, item.id);
        assert_eq!(e.company_id, "rental-jaya");
        assert_eq!(e.title, "Toyota Avanza");
        assert_eq!(e.category, "products");
        assert_eq!(e.tags, vec!["vehicle".to_string(), "toyota-avanza".to_string()]);
        assert_eq!(e.priority, DEFAULT_PRIORITY);
        assert!(e.content.contains("Price: Rp 150.000/hari"));
        assert!(e.content.contains("Weekly rate: Rp 900.000"));
        assert!(!e.content.contains("Monthly"));
    }

    #[test]
    fn test_room_content_uses_weekday_for_missing_weekend() {
        let mut draft = ItemDraft::new("hotel", ItemCategory::Room, "Deluxe");
        draft.pricing.weekday = Some(450000);
        let item = Item::create(draft).unwrap();

        let content = render_content(&item, &PriceFormatter::default());
        assert!(content.contains("Price: Rp 450.000/malam"));
        assert!(content.contains("Weekend rate: Rp 450.000"));
    }

    #[test]
    fn test_featured_items_rank_higher() {
        let mut item = vehicle();
        item.is_featured = true;

        let ItemSyncEvent::Upserted(e) = upserted(&item, &PriceFormatter::default()) else {
            panic!("expected upsert");
        };
        assert_eq!(e.priority, FEATURED_PRIORITY);
    }

    #[test]
    fn test_projection_reuses_existing_record() {
        let item = vehicle();
        let ItemSyncEvent::Upserted(e) = upserted(&item, &PriceFormatter::default()) else {
            panic!("expected upsert");
        };

        let first = project_record(&e, None);
        assert_eq!(first.source_type, SourceType::Item);
        assert_eq!(first.source_id, Some(item.id));
        assert!(first.ensure_mutable().is_err());

        let second = project_record(&e, Some(&first));
        assert_eq!(second.id, first.id);
        assert_eq!(second.created_at, first.created_at);
    }

    #[test]
    fn test_deleted_event() {
        let item = vehicle();
        let event = deleted(&item);
        assert_eq!(event.item_id(), item.id);
        assert_eq!(event.event_type(), "item.deleted");
    }
}
