use uuid::Uuid;

/// Topic the knowledge synchronizer subscribes to.
pub const ITEM_SYNC_TOPIC: &str = "catalog.item_sync";

/// Knowledge article the synchronizer should hold for an item.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
pub struct ItemUpsertedEvent {
    pub item_id: Uuid,
    pub company_id: String,
    pub title: String,
    pub content: String,
    pub category: String,
    pub tags: Vec<String>,
    pub priority: i32,
    pub is_active: bool,
    pub timestamp: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
pub struct ItemDeletedEvent {
    pub item_id: Uuid,
    pub company_id: String,
    pub timestamp: i64,
}

/// Item lifecycle change mirrored into the knowledge base by an external service.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
#[serde(tag = "event_type")]
pub enum ItemSyncEvent {
    #[serde(rename = "item.upserted")]
    Upserted(ItemUpsertedEvent),
    #[serde(rename = "item.deleted")]
    Deleted(ItemDeletedEvent),
}

impl ItemSyncEvent {
    pub fn item_id(&self) -> Uuid {
        match self {
            ItemSyncEvent::Upserted(e) => e.item_id,
            ItemSyncEvent::Deleted(e) => e.item_id,
        }
    }

    pub fn company_id(&self) -> &str {
        match self {
            ItemSyncEvent::Upserted(e) => &e.company_id,
            ItemSyncEvent::Deleted(e) => &e.company_id,
        }
    }

    pub fn event_type(&self) -> &'static str {
        match self {
            ItemSyncEvent::Upserted(_) => "item.upserted",
            ItemSyncEvent::Deleted(_) => "item.deleted",
        }
    }

    /// Partition key; keeps every event of one item in order.
    pub fn key(&self) -> String {
        self.item_id().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_tag_in_payload() {
        let event = ItemSyncEvent::Deleted(ItemDeletedEvent {
            item_id: Uuid::nil(),
            company_id: "acme".to_string(),
            timestamp: 0,
        });

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event_type"], "item.deleted");
        assert_eq!(json["company_id"], "acme");

        let back: ItemSyncEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
        assert_eq!(back.event_type(), "item.deleted");
    }
}
