use async_trait::async_trait;
use chrono::{DateTime, Utc};
use concierge_core::outbox::OutboxMessage;
use concierge_core::repository::{OutboxRepository, RepoError};
use serde_json::Value;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

pub struct PgOutboxRepository {
    pool: PgPool,
}

impl PgOutboxRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct OutboxRow {
    id: Uuid,
    aggregate_id: Uuid,
    topic: String,
    event_key: String,
    payload: Value,
    created_at: DateTime<Utc>,
    published_at: Option<DateTime<Utc>>,
}

impl From<OutboxRow> for OutboxMessage {
    fn from(row: OutboxRow) -> Self {
        OutboxMessage {
            id: row.id,
            aggregate_id: row.aggregate_id,
            topic: row.topic,
            event_key: row.event_key,
            payload: row.payload,
            created_at: row.created_at,
            published_at: row.published_at,
        }
    }
}

/// Writes an outbox row on the caller's connection, normally inside the
/// transaction of the item write it describes.
pub(crate) async fn write_outbox(conn: &mut PgConnection, message: &OutboxMessage) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO sync_outbox (id, aggregate_id, topic, event_key, payload, created_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(message.id)
    .bind(message.aggregate_id)
    .bind(&message.topic)
    .bind(&message.event_key)
    .bind(&message.payload)
    .bind(message.created_at)
    .execute(conn)
    .await?;

    Ok(())
}

#[async_trait]
impl OutboxRepository for PgOutboxRepository {
    async fn fetch_pending(&self, limit: usize) -> Result<Vec<OutboxMessage>, RepoError> {
        let rows: Vec<OutboxRow> = sqlx::query_as(
            r#"
            SELECT id, aggregate_id, topic, event_key, payload, created_at, published_at
            FROM sync_outbox
            WHERE published_at IS NULL
            ORDER BY seq
            LIMIT $1
            "#,
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(OutboxMessage::from).collect())
    }

    async fn mark_published(&self, ids: &[Uuid]) -> Result<(), RepoError> {
        sqlx::query("UPDATE sync_outbox SET published_at = NOW() WHERE id = ANY($1)")
            .bind(ids.to_vec())
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
