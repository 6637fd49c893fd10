pub mod item;
pub mod pricing;
pub mod resolver;
pub mod format;
pub mod knowledge;
pub mod sync;

pub use item::{Item, ItemCategory, ItemDraft, ItemStats};
pub use pricing::{Amount, Headcount, Pricing, PricingWarning};
pub use resolver::{resolve, PricingInput};
pub use format::{DisplayConfig, PriceFormatter};
pub use knowledge::{EditTarget, KnowledgeDraft, KnowledgeRecord, KnowledgeStats, SourceType};

/// Catalog validation errors
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum CatalogError {
    #[error("Unknown item category: {0}")]
    UnknownCategory(String),

    #[error("Unknown knowledge source type: {0}")]
    UnknownSourceType(String),

    #[error("Item category cannot change from {from} to {to}")]
    CategoryChanged {
        from: ItemCategory,
        to: ItemCategory,
    },

    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("Knowledge record {record_id} is synced from an item and can only change through that item")]
    ItemOwned {
        record_id: uuid::Uuid,
        item_id: Option<uuid::Uuid>,
    },

    #[error("Knowledge records with source type 'item' are created by item sync only")]
    ItemSourceNotAllowed,
}
