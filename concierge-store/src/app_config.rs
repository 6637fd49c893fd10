use concierge_catalog::DisplayConfig;
use serde::Deserialize;
use std::env;

/// Process configuration, loaded once at start and handed to every component.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    #[serde(default)]
    pub kafka: Option<KafkaConfig>,
    pub sync: SyncConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    pub backend: StoreBackend,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_true")]
    pub run_migrations: bool,
}

fn default_max_connections() -> u32 { 5 }

fn default_true() -> bool { true }

#[derive(Debug, Deserialize, Clone)]
pub struct RedisConfig {
    pub url: String,
    /// Approximate cap on the sync stream length
    #[serde(default = "default_stream_max_len")]
    pub stream_max_len: usize,
}

fn default_stream_max_len() -> usize { 10_000 }

#[derive(Debug, Deserialize, Clone)]
pub struct KafkaConfig {
    pub brokers: String,
}

/// Where relayed item events go.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PublisherKind {
    /// Redis stream read by the external synchronizer
    Redis,
    /// Kafka topic; needs the `kafka` feature
    Kafka,
    /// Apply events to this deployment's own knowledge table
    Stub,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SyncConfig {
    pub publisher: PublisherKind,
    #[serde(default = "default_relay_interval_ms")]
    pub relay_interval_ms: u64,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

fn default_relay_interval_ms() -> u64 { 1_000 }

fn default_batch_size() -> usize { 100 }

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Per-environment overrides, optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Untracked local overrides
            .add_source(config::File::with_name("config/local").required(false))
            // Eg. `CONCIERGE__SERVER__PORT=9000`
            .add_source(config::Environment::with_prefix("CONCIERGE").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
