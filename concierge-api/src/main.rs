use anyhow::Context;
use concierge_api::{app, worker, AppState};
use concierge_catalog::PriceFormatter;
use concierge_core::memory::MemoryStore;
use concierge_core::outbox::{EventPublisher, OutboxRelay};
use concierge_core::repository::{ItemRepository, KnowledgeRepository, OutboxRepository};
use concierge_core::sync::KnowledgeSyncStub;
use concierge_core::CatalogService;
use concierge_store::app_config::{Config, PublisherKind, StoreBackend};
use concierge_store::{DbClient, PgItemRepository, PgKnowledgeRepository, PgOutboxRepository, RedisStreamProducer};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

struct Repositories {
    items: Arc<dyn ItemRepository>,
    knowledge: Arc<dyn KnowledgeRepository>,
    outbox: Arc<dyn OutboxRepository>,
}

async fn build_repositories(config: &Config) -> anyhow::Result<Repositories> {
    match config.store.backend {
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory store; data is lost on restart");
            let store = MemoryStore::new();
            Ok(Repositories {
                items: Arc::new(store.clone()),
                knowledge: Arc::new(store.clone()),
                outbox: Arc::new(store),
            })
        }
        StoreBackend::Postgres => {
            let db = DbClient::new(&config.database.url, config.database.max_connections)
                .await
                .context("Failed to connect to Postgres")?;
            if config.database.run_migrations {
                db.migrate().await.context("Failed to run migrations")?;
            }
            Ok(Repositories {
                items: Arc::new(PgItemRepository::new(db.pool.clone())),
                knowledge: Arc::new(PgKnowledgeRepository::new(db.pool.clone())),
                outbox: Arc::new(PgOutboxRepository::new(db.pool)),
            })
        }
    }
}

fn build_publisher(config: &Config, repos: &Repositories) -> anyhow::Result<Arc<dyn EventPublisher>> {
    match config.sync.publisher {
        PublisherKind::Stub => Ok(Arc::new(KnowledgeSyncStub::new(repos.knowledge.clone()))),
        PublisherKind::Redis => {
            let producer = RedisStreamProducer::new(&config.redis.url, config.redis.stream_max_len)
                .context("Failed to create Redis client")?;
            Ok(Arc::new(producer))
        }
        #[cfg(feature = "kafka")]
        PublisherKind::Kafka => {
            let kafka = config.kafka.as_ref().context("[kafka] section is required for the kafka publisher")?;
            let producer = concierge_store::KafkaEventProducer::new(&kafka.brokers)
                .context("Failed to create Kafka producer")?;
            Ok(Arc::new(producer))
        }
        #[cfg(not(feature = "kafka"))]
        PublisherKind::Kafka => anyhow::bail!("the kafka publisher needs a build with the `kafka` feature"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "concierge_api=debug,concierge_core=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting Concierge API on port {}", config.server.port);

    let repos = build_repositories(&config).await?;
    let publisher = build_publisher(&config, &repos)?;

    let relay = OutboxRelay::new(repos.outbox.clone(), publisher, config.sync.batch_size);
    tokio::spawn(worker::start_outbox_relay(relay, config.sync.relay_interval_ms));

    let catalog = CatalogService::new(
        repos.items.clone(),
        repos.knowledge.clone(),
        PriceFormatter::new(config.display.clone()),
    );
    let app = app(AppState::new(catalog));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
