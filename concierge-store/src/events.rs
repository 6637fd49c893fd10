use async_trait::async_trait;
use concierge_core::outbox::EventPublisher;
use concierge_core::repository::RepoError;
use tracing::{debug, error};

/// Publishes sync events onto a Redis stream named after the topic.
///
/// Entries carry two fields, `key` (the item id) and `payload` (the event JSON).
#[derive(Clone)]
pub struct RedisStreamProducer {
    client: redis::Client,
    max_len: usize,
}

impl RedisStreamProducer {
    pub fn new(connection_string: &str, max_len: usize) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(connection_string)?;
        Ok(Self { client, max_len })
    }

    pub async fn append(&self, stream: &str, key: &str, payload: &str) -> Result<String, redis::RedisError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        // MAXLEN ~ lets Redis trim lazily
        let entry_id: String = redis::cmd("XADD")
            .arg(stream)
            .arg("MAXLEN")
            .arg("~")
            .arg(self.max_len)
            .arg("*")
            .arg("key")
            .arg(key)
            .arg("payload")
            .arg(payload)
            .query_async(&mut conn)
            .await?;

        Ok(entry_id)
    }
}

#[async_trait]
impl EventPublisher for RedisStreamProducer {
    async fn publish(&self, topic: &str, key: &str, payload: &str) -> Result<(), RepoError> {
        match self.append(topic, key, payload).await {
            Ok(entry_id) => {
                debug!("Appended {} to stream {} as {}", key, topic, entry_id);
                Ok(())
            }
            Err(e) => {
                error!("Failed to append {} to stream {}: {}", key, topic, e);
                Err(e.into())
            }
        }
    }
}

#[cfg(feature = "kafka")]
pub use kafka::KafkaEventProducer;

#[cfg(feature = "kafka")]
mod kafka {
    use super::*;
    use rdkafka::config::ClientConfig;
    use rdkafka::producer::{FutureProducer, FutureRecord};
    use rdkafka::util::Timeout;
    use std::time::Duration;
    use tracing::info;

    /// Kafka alternative to the Redis stream; the item id is the message key so
    /// one item's events share a partition.
    #[derive(Clone)]
    pub struct KafkaEventProducer {
        producer: FutureProducer,
    }

    impl KafkaEventProducer {
        pub fn new(brokers: &str) -> Result<Self, rdkafka::error::KafkaError> {
            let producer: FutureProducer = ClientConfig::new()
                .set("bootstrap.servers", brokers)
                .set("message.timeout.ms", "5000")
                .create()?;

            Ok(Self { producer })
        }
    }

    #[async_trait]
    impl EventPublisher for KafkaEventProducer {
        async fn publish(&self, topic: &str, key: &str, payload: &str) -> Result<(), RepoError> {
            let record = FutureRecord::to(topic).key(key).payload(payload);

            match self.producer.send(record, Timeout::After(Duration::from_secs(0))).await {
                Ok(delivery) => {
                    info!(
                        "Sent {} to {}: partition {} offset {}",
                        key, topic, delivery.partition, delivery.offset
                    );
                    Ok(())
                }
                Err((e, _msg)) => {
                    error!("Failed to send {} to {}: {}", key, topic, e);
                    Err(e.into())
                }
            }
        }
    }
}
