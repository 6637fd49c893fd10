use async_trait::async_trait;
use chrono::{DateTime, Utc};
use concierge_shared::models::events::{ItemSyncEvent, ITEM_SYNC_TOPIC};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::repository::{OutboxRepository, RepoError};
use crate::CoreResult;

/// A sync event waiting to be published, stored alongside the item write.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutboxMessage {
    pub id: Uuid,
    pub aggregate_id: Uuid,
    pub topic: String,
    pub event_key: String,
    pub payload: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
}

impl OutboxMessage {
    pub fn from_event(event: &ItemSyncEvent) -> Result<Self, serde_json::Error> {
        Ok(Self {
            id: Uuid::new_v4(),
            aggregate_id: event.item_id(),
            topic: ITEM_SYNC_TOPIC.to_string(),
            event_key: event.key(),
            payload: serde_json::to_value(event)?,
            created_at: Utc::now(),
            published_at: None,
        })
    }

    pub fn event(&self) -> Result<ItemSyncEvent, serde_json::Error> {
        serde_json::from_value(self.payload.clone())
    }
}

/// Destination of relayed outbox messages.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, topic: &str, key: &str, payload: &str) -> Result<(), RepoError>;
}

/// Moves pending outbox messages to the publisher.
pub struct OutboxRelay {
    outbox: Arc<dyn OutboxRepository>,
    publisher: Arc<dyn EventPublisher>,
    batch_size: usize,
}

impl OutboxRelay {
    pub fn new(outbox: Arc<dyn OutboxRepository>, publisher: Arc<dyn EventPublisher>, batch_size: usize) -> Self {
        Self {
            outbox,
            publisher,
            batch_size: batch_size.max(1),
        }
    }

    /// Publishes one batch and returns how many messages went out.
    ///
    /// Stops at the first failed publish so later events for the same item
    /// are never delivered ahead of it; the rest stays pending.
    pub async fn run_once(&self) -> CoreResult<usize> {
        let pending = self.outbox.fetch_pending(self.batch_size).await?;
        if pending.is_empty() {
            return Ok(0);
        }

        let mut published = Vec::with_capacity(pending.len());
        for message in &pending {
            let payload = message.payload.to_string();
            match self
                .publisher
                .publish(&message.topic, &message.event_key, &payload)
                .await
            {
                Ok(()) => published.push(message.id),
                Err(e) => {
                    warn!("Failed to publish outbox message {}: {}", message.id, e);
                    break;
                }
            }
        }

        if !published.is_empty() {
            self.outbox.mark_published(&published).await?;
            info!("Relayed {} of {} outbox messages", published.len(), pending.len());
        }

        Ok(published.len())
    }
}
