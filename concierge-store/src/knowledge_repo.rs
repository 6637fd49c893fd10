use async_trait::async_trait;
use chrono::{DateTime, Utc};
use concierge_catalog::knowledge::{DEFAULT_CATEGORY, DEFAULT_PRIORITY};
use concierge_catalog::{KnowledgeRecord, SourceType};
use concierge_core::repository::{KnowledgeFilter, KnowledgeRepository, RepoError};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

const KNOWLEDGE_COLUMNS: &str = "id, company_id, title, content, category, tags, priority, source_type, \
     source_id, is_active, created_at, updated_at";

pub struct PgKnowledgeRepository {
    pool: PgPool,
}

impl PgKnowledgeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct KnowledgeRow {
    id: Uuid,
    company_id: String,
    title: String,
    content: String,
    category: Option<String>,
    tags: Vec<String>,
    priority: Option<i32>,
    source_type: Option<String>,
    source_id: Option<Uuid>,
    is_active: Option<bool>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

impl KnowledgeRow {
    fn into_record(self) -> Result<KnowledgeRecord, RepoError> {
        let source_type = match self.source_type {
            Some(raw) => raw.parse()?,
            None => SourceType::Manual,
        };
        let created_at = self.created_at.unwrap_or_else(Utc::now);

        Ok(KnowledgeRecord {
            id: self.id,
            company_id: self.company_id,
            title: self.title,
            content: self.content,
            category: self.category.unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            tags: self.tags,
            priority: self.priority.unwrap_or(DEFAULT_PRIORITY),
            source_type,
            source_id: self.source_id,
            is_active: self.is_active.unwrap_or(true),
            created_at,
            updated_at: self.updated_at.unwrap_or(created_at),
        })
    }
}

#[async_trait]
impl KnowledgeRepository for PgKnowledgeRepository {
    async fn insert_record(&self, record: &KnowledgeRecord) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            INSERT INTO knowledge_base (id, company_id, title, content, category, tags, priority, source_type, source_id, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(record.id)
        .bind(&record.company_id)
        .bind(&record.title)
        .bind(&record.content)
        .bind(&record.category)
        .bind(&record.tags)
        .bind(record.priority)
        .bind(record.source_type.as_str())
        .bind(record.source_id)
        .bind(record.is_active)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update_record(&self, record: &KnowledgeRecord) -> Result<bool, RepoError> {
        let result = sqlx::query(
            r#"
            UPDATE knowledge_base
            SET company_id = $1, title = $2, content = $3, category = $4, tags = $5,
                priority = $6, is_active = $7, updated_at = $8
            WHERE id = $9
            "#,
        )
        .bind(&record.company_id)
        .bind(&record.title)
        .bind(&record.content)
        .bind(&record.category)
        .bind(&record.tags)
        .bind(record.priority)
        .bind(record.is_active)
        .bind(record.updated_at)
        .bind(record.id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_record(&self, id: Uuid) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM knowledge_base WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn get_record(&self, id: Uuid) -> Result<Option<KnowledgeRecord>, RepoError> {
        let row: Option<KnowledgeRow> =
            sqlx::query_as(&format!("SELECT {} FROM knowledge_base WHERE id = $1", KNOWLEDGE_COLUMNS))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(KnowledgeRow::into_record).transpose()
    }

    async fn list_records(&self, filter: &KnowledgeFilter) -> Result<Vec<KnowledgeRecord>, RepoError> {
        let mut query =
            QueryBuilder::<Postgres>::new(format!("SELECT {} FROM knowledge_base WHERE TRUE", KNOWLEDGE_COLUMNS));

        if let Some(company_id) = &filter.company_id {
            query.push(" AND company_id = ").push_bind(company_id.clone());
        }
        if let Some(source_type) = filter.source_type {
            query.push(" AND source_type = ").push_bind(source_type.as_str());
        }
        query.push(" ORDER BY priority DESC, title");

        let rows: Vec<KnowledgeRow> = query.build_query_as().fetch_all(&self.pool).await?;
        rows.into_iter().map(KnowledgeRow::into_record).collect()
    }

    async fn find_by_source(
        &self,
        source_type: SourceType,
        source_id: Uuid,
    ) -> Result<Vec<KnowledgeRecord>, RepoError> {
        let rows: Vec<KnowledgeRow> = sqlx::query_as(&format!(
            "SELECT {} FROM knowledge_base WHERE source_type = $1 AND source_id = $2 ORDER BY created_at",
            KNOWLEDGE_COLUMNS
        ))
        .bind(source_type.as_str())
        .bind(source_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(KnowledgeRow::into_record).collect()
    }

    async fn delete_by_source(&self, source_type: SourceType, source_id: Uuid) -> Result<u64, RepoError> {
        let result = sqlx::query("DELETE FROM knowledge_base WHERE source_type = $1 AND source_id = $2")
            .bind(source_type.as_str())
            .bind(source_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
