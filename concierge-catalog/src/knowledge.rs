use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::CatalogError;

pub const DEFAULT_CATEGORY: &str = "general";
pub const DEFAULT_PRIORITY: i32 = 5;
pub const MIN_PRIORITY: i32 = 1;
pub const MAX_PRIORITY: i32 = 10;

/// Where a knowledge record came from.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    #[default]
    Manual,
    /// Mirrored from an item; owned by the item lifecycle
    Item,
    Faq,
    Import,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::Manual => "manual",
            SourceType::Item => "item",
            SourceType::Faq => "faq",
            SourceType::Import => "import",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceType {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manual" => Ok(SourceType::Manual),
            "item" => Ok(SourceType::Item),
            "faq" => Ok(SourceType::Faq),
            "import" => Ok(SourceType::Import),
            other => Err(CatalogError::UnknownSourceType(other.to_string())),
        }
    }
}

/// A text article the chat backend answers from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KnowledgeRecord {
    pub id: Uuid,
    pub company_id: String,
    pub title: String,
    pub content: String,
    pub category: String,
    pub tags: Vec<String>,
    pub priority: i32,
    pub source_type: SourceType,
    pub source_id: Option<Uuid>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Where an edit of a knowledge record has to happen.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EditTarget {
    Knowledge { id: Uuid },
    Item { item_id: Option<Uuid> },
}

impl EditTarget {
    pub fn path(&self) -> String {
        match self {
            EditTarget::Knowledge { id } => format!("/knowledge/{}", id),
            EditTarget::Item { item_id: Some(id) } => format!("/items/{}", id),
            EditTarget::Item { item_id: None } => "/items".to_string(),
        }
    }
}

impl KnowledgeRecord {
    pub fn is_item_owned(&self) -> bool {
        self.source_type == SourceType::Item
    }

    /// Rejects edits and deletes of records mirrored from an item.
    pub fn ensure_mutable(&self) -> Result<(), CatalogError> {
        if self.is_item_owned() {
            return Err(CatalogError::ItemOwned {
                record_id: self.id,
                item_id: self.source_id,
            });
        }
        Ok(())
    }

    pub fn edit_target(&self) -> EditTarget {
        if self.is_item_owned() {
            EditTarget::Item { item_id: self.source_id }
        } else {
            EditTarget::Knowledge { id: self.id }
        }
    }

    pub fn create(draft: KnowledgeDraft) -> Result<Self, CatalogError> {
        draft.validate()?;
        if draft.source_type == SourceType::Item {
            return Err(CatalogError::ItemSourceNotAllowed);
        }

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            category: draft.resolved_category(),
            priority: clamp_priority(draft.priority),
            tags: clean_tags(draft.tags),
            company_id: draft.company_id,
            title: draft.title,
            content: draft.content,
            source_type: draft.source_type,
            source_id: draft.source_id,
            is_active: draft.is_active,
            created_at: now,
            updated_at: now,
        })
    }

    /// Overwrite the editable fields. Source fields never change here.
    pub fn apply(&mut self, draft: KnowledgeDraft) -> Result<(), CatalogError> {
        self.ensure_mutable()?;
        draft.validate()?;

        self.category = draft.resolved_category();
        self.priority = clamp_priority(draft.priority);
        self.tags = clean_tags(draft.tags);
        self.company_id = draft.company_id;
        self.title = draft.title;
        self.content = draft.content;
        self.is_active = draft.is_active;
        self.updated_at = Utc::now();

        Ok(())
    }
}

/// Knowledge fields as submitted by an operator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeDraft {
    pub company_id: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub category: Option<String>,
    /// A list, or one comma-separated string as the admin form sends it
    #[serde(default, deserialize_with = "tags_field")]
    pub tags: Vec<String>,
    #[serde(default = "default_priority")]
    pub priority: i32,
    #[serde(default)]
    pub source_type: SourceType,
    #[serde(default)]
    pub source_id: Option<Uuid>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn tags_field<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Tags {
        Joined(String),
        List(Vec<String>),
    }

    Ok(match Tags::deserialize(deserializer)? {
        Tags::Joined(raw) => parse_tags(&raw),
        Tags::List(tags) => tags,
    })
}

fn default_priority() -> i32 {
    DEFAULT_PRIORITY
}

fn default_true() -> bool {
    true
}

impl KnowledgeDraft {
    pub fn new(company_id: impl Into<String>, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            company_id: company_id.into(),
            title: title.into(),
            content: content.into(),
            category: None,
            tags: Vec::new(),
            priority: DEFAULT_PRIORITY,
            source_type: SourceType::Manual,
            source_id: None,
            is_active: true,
        }
    }

    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.company_id.trim().is_empty() {
            return Err(CatalogError::MissingField("company_id"));
        }
        if self.title.trim().is_empty() {
            return Err(CatalogError::MissingField("title"));
        }
        Ok(())
    }

    fn resolved_category(&self) -> String {
        self.category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_CATEGORY)
            .to_string()
    }
}

fn clamp_priority(priority: i32) -> i32 {
    priority.clamp(MIN_PRIORITY, MAX_PRIORITY)
}

fn clean_tags(tags: Vec<String>) -> Vec<String> {
    tags.into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Splits a comma-separated tag field, e.g. `"seo, website, murah"`.
pub fn parse_tags(raw: &str) -> Vec<String> {
    clean_tags(raw.split(',').map(String::from).collect())
}

/// Counts shown above the knowledge list.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct KnowledgeStats {
    pub total: usize,
    pub manual: usize,
    pub auto_synced: usize,
}

impl KnowledgeStats {
    pub fn from_records(records: &[KnowledgeRecord]) -> Self {
        Self {
            total: records.len(),
            manual: records.iter().filter(|r| r.source_type == SourceType::Manual).count(),
            auto_synced: records.iter().filter(|r| r.is_item_owned()).count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item_owned_record() -> KnowledgeRecord {
        let mut record = KnowledgeRecord::create(KnowledgeDraft::new("acme", "Avanza", "...")).unwrap();
        record.source_type = SourceType::Item;
        record.source_id = Some(Uuid::new_v4());
        record
    }

    #[test]
    fn test_manual_record_defaults() {
        let mut draft = KnowledgeDraft::new("acme", "Jam buka", "Buka setiap hari 08.00-17.00");
        draft.tags = parse_tags("jam, , buka ");
        draft.priority = 42;

        let record = KnowledgeRecord::create(draft).unwrap();
        assert_eq!(record.category, "general");
        assert_eq!(record.tags, vec!["jam".to_string(), "buka".to_string()]);
        assert_eq!(record.priority, MAX_PRIORITY);
        assert_eq!(record.source_type, SourceType::Manual);
        assert_eq!(record.edit_target(), EditTarget::Knowledge { id: record.id });
    }

    #[test]
    fn test_item_source_cannot_be_created_directly() {
        let mut draft = KnowledgeDraft::new("acme", "Avanza", "...");
        draft.source_type = SourceType::Item;
        assert_eq!(KnowledgeRecord::create(draft), Err(CatalogError::ItemSourceNotAllowed));
    }

    #[test]
    fn test_item_owned_record_is_locked() {
        let mut record = item_owned_record();
        let item_id = record.source_id;

        assert_eq!(
            record.ensure_mutable(),
            Err(CatalogError::ItemOwned { record_id: record.id, item_id })
        );
        assert!(record.apply(KnowledgeDraft::new("acme", "Edited", "...")).is_err());
        assert_eq!(record.title, "Avanza");

        let target = record.edit_target();
        assert_eq!(target.path(), format!("/items/{}", item_id.unwrap()));
    }

    #[test]
    fn test_apply_keeps_source() {
        let mut draft = KnowledgeDraft::new("acme", "FAQ", "...");
        draft.source_type = SourceType::Faq;
        let mut record = KnowledgeRecord::create(draft).unwrap();

        let mut edit = KnowledgeDraft::new("acme", "FAQ updated", "new");
        edit.source_type = SourceType::Item;
        record.apply(edit).unwrap();

        assert_eq!(record.title, "FAQ updated");
        assert_eq!(record.source_type, SourceType::Faq);
    }

    #[test]
    fn test_draft_accepts_joined_tags() {
        let draft: KnowledgeDraft = serde_json::from_value(serde_json::json!({
            "company_id": "acme",
            "title": "Jasa SEO",
            "content": "...",
            "tags": "seo, website, murah"
        }))
        .unwrap();
        assert_eq!(draft.tags, vec!["seo", "website", "murah"]);
        assert_eq!(draft.priority, DEFAULT_PRIORITY);

        let draft: KnowledgeDraft = serde_json::from_value(serde_json::json!({
            "company_id": "acme",
            "title": "Jasa SEO",
            "content": "...",
            "tags": ["seo"]
        }))
        .unwrap();
        assert_eq!(draft.tags, vec!["seo"]);
    }

    #[test]
    fn test_stats() {
        let manual = KnowledgeRecord::create(KnowledgeDraft::new("acme", "a", "")).unwrap();
        let synced = item_owned_record();
        let mut faq = KnowledgeDraft::new("acme", "b", "");
        faq.source_type = SourceType::Faq;
        let faq = KnowledgeRecord::create(faq).unwrap();

        let stats = KnowledgeStats::from_records(&[manual, synced, faq]);
        assert_eq!(stats, KnowledgeStats { total: 3, manual: 1, auto_synced: 1 });
    }
}
