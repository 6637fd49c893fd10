pub mod app_config;
pub mod database;
pub mod events;
pub mod item_repo;
pub mod knowledge_repo;
pub mod outbox_repo;

pub use database::DbClient;
pub use events::RedisStreamProducer;
#[cfg(feature = "kafka")]
pub use events::KafkaEventProducer;
pub use item_repo::PgItemRepository;
pub use knowledge_repo::PgKnowledgeRepository;
pub use outbox_repo::PgOutboxRepository;
