use async_trait::async_trait;
use chrono::{DateTime, Utc};
use concierge_catalog::{Item, ItemCategory, Pricing};
use concierge_core::outbox::OutboxMessage;
use concierge_core::repository::{ItemFilter, ItemRepository, RepoError};
use serde_json::Value;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::debug;
use uuid::Uuid;

use crate::outbox_repo::write_outbox;

const ITEM_COLUMNS: &str = "id, company_id, item_type, name, slug, description, short_description, \
     base_pricing, is_featured, is_active, created_at, updated_at";

pub struct PgItemRepository {
    pool: PgPool,
}

impl PgItemRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ItemRow {
    id: Uuid,
    company_id: String,
    item_type: String,
    name: String,
    slug: Option<String>,
    description: Option<String>,
    short_description: Option<String>,
    base_pricing: Option<Value>,
    is_featured: Option<bool>,
    is_active: Option<bool>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

impl ItemRow {
    fn into_item(self) -> Result<Item, RepoError> {
        let category: ItemCategory = self.item_type.parse()?;
        let created_at = self.created_at.unwrap_or_else(Utc::now);

        Ok(Item {
            id: self.id,
            company_id: self.company_id,
            category,
            name: self.name,
            slug: self.slug.unwrap_or_default(),
            description: self.description,
            short_description: self.short_description,
            // Rows may be hand-edited; classification never fails.
            pricing: Pricing::from(self.base_pricing.unwrap_or(Value::Null)),
            is_featured: self.is_featured.unwrap_or(false),
            is_active: self.is_active.unwrap_or(true),
            created_at,
            updated_at: self.updated_at.unwrap_or(created_at),
        })
    }
}

#[async_trait]
impl ItemRepository for PgItemRepository {
    async fn insert_item(&self, item: &Item, outbox: &OutboxMessage) -> Result<(), RepoError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO items (id, company_id, item_type, name, slug, description, short_description, base_pricing, is_featured, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(item.id)
        .bind(&item.company_id)
        .bind(item.category.as_str())
        .bind(&item.name)
        .bind(&item.slug)
        .bind(&item.description)
        .bind(&item.short_description)
        .bind(Value::from(item.pricing.clone()))
        .bind(item.is_featured)
        .bind(item.is_active)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&mut *tx)
        .await?;

        write_outbox(&mut *tx, outbox).await?;
        tx.commit().await?;

        debug!("Inserted item {} with outbox message {}", item.id, outbox.id);
        Ok(())
    }

    async fn update_item(&self, item: &Item, outbox: &OutboxMessage) -> Result<bool, RepoError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE items
            SET company_id = $1, name = $2, slug = $3, description = $4, short_description = $5,
                base_pricing = $6, is_featured = $7, is_active = $8, updated_at = $9
            WHERE id = $10
            "#,
        )
        .bind(&item.company_id)
        .bind(&item.name)
        .bind(&item.slug)
        .bind(&item.description)
        .bind(&item.short_description)
        .bind(Value::from(item.pricing.clone()))
        .bind(item.is_featured)
        .bind(item.is_active)
        .bind(item.updated_at)
        .bind(item.id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        write_outbox(&mut *tx, outbox).await?;
        tx.commit().await?;
        Ok(true)
    }

    async fn delete_item(&self, id: Uuid, outbox: &OutboxMessage) -> Result<bool, RepoError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("DELETE FROM items WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        write_outbox(&mut *tx, outbox).await?;
        tx.commit().await?;
        Ok(true)
    }

    async fn get_item(&self, id: Uuid) -> Result<Option<Item>, RepoError> {
        let row: Option<ItemRow> = sqlx::query_as(&format!("SELECT {} FROM items WHERE id = $1", ITEM_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(ItemRow::into_item).transpose()
    }

    async fn list_items(&self, filter: &ItemFilter) -> Result<Vec<Item>, RepoError> {
        let mut query = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM items WHERE TRUE", ITEM_COLUMNS));

        if let Some(company_id) = &filter.company_id {
            query.push(" AND company_id = ").push_bind(company_id.clone());
        }
        if let Some(category) = filter.category {
            query.push(" AND item_type = ").push_bind(category.as_str());
        }
        query.push(" ORDER BY name");

        let rows: Vec<ItemRow> = query.build_query_as().fetch_all(&self.pool).await?;
        rows.into_iter().map(ItemRow::into_item).collect()
    }
}
