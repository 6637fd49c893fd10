pub mod repository;
pub mod outbox;
pub mod sync;
pub mod service;
pub mod memory;

use concierge_catalog::CatalogError;
use uuid::Uuid;

pub use service::CatalogService;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    ValidationError(String),

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: Uuid },

    #[error("Knowledge record {record_id} is synced from an item; edit the item instead")]
    ItemOwnedKnowledge {
        record_id: Uuid,
        item_id: Option<Uuid>,
    },

    #[error("Persistence failed: {0}")]
    PersistenceError(String),

    #[error("Internal service error: {0}")]
    InternalError(String),
}

impl From<CatalogError> for CoreError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::ItemOwned { record_id, item_id } => {
                CoreError::ItemOwnedKnowledge { record_id, item_id }
            }
            other => CoreError::ValidationError(other.to_string()),
        }
    }
}

impl From<repository::RepoError> for CoreError {
    fn from(err: repository::RepoError) -> Self {
        CoreError::PersistenceError(err.to_string())
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
