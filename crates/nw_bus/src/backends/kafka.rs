use async_trait::async_trait;
use nw_core::config::BusConfig;
use nw_core::{BusMessage, BusPublisher, BusSubscriber, Error, Result};
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::message::Message;
use rdkafka::producer::{FutureProducer, FutureRecord};
use std::time::Duration;
use tracing::info;

/// Kafka producer for the ingestion stage. Delivery is fire-and-observe:
/// the periodic driver logs per-message failures and keeps going.
pub struct KafkaPublisher {
    producer: FutureProducer,
    topic: String,
}

impl KafkaPublisher {
    pub fn new(config: &BusConfig) -> Result<Self> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", &config.brokers)
            .set("message.timeout.ms", "5000")
            .create()
            .map_err(|e| Error::Publish(format!("failed to create kafka producer: {}", e)))?;
        info!("Kafka producer connected to {}", config.brokers);
        Ok(Self {
            producer,
            topic: config.topic.clone(),
        })
    }
}

#[async_trait]
impl BusPublisher for KafkaPublisher {
    async fn send(&self, key: &str, payload: Vec<u8>) -> Result<()> {
        let record = FutureRecord::to(&self.topic).key(key).payload(&payload);
        self.producer
            .send(record, Duration::from_secs(5))
            .await
            .map(|_| ())
            .map_err(|(e, _)| Error::Publish(format!("kafka send failed: {}", e)))
    }
}

/// Kafka consumer for the storage stage. Offsets auto-commit, so a record
/// whose persistence fails is not redelivered; the pipeline accepts that.
pub struct KafkaSubscriber {
    consumer: StreamConsumer,
}

impl KafkaSubscriber {
    pub fn new(config: &BusConfig) -> Result<Self> {
        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", &config.brokers)
            .set("group.id", &config.group_id)
            .set("enable.auto.commit", "true")
            .set("auto.offset.reset", "earliest")
            .create()
            .map_err(|e| Error::Consume(format!("failed to create kafka consumer: {}", e)))?;
        consumer
            .subscribe(&[&config.topic])
            .map_err(|e| Error::Consume(format!("failed to subscribe to {}: {}", config.topic, e)))?;
        info!(
            "Kafka consumer joined group {} on topic {}",
            config.group_id, config.topic
        );
        Ok(Self { consumer })
    }
}

#[async_trait]
impl BusSubscriber for KafkaSubscriber {
    async fn next_message(&mut self) -> Result<Option<BusMessage>> {
        match self.consumer.recv().await {
            Ok(message) => Ok(Some(BusMessage {
                key: message
                    .key()
                    .map(|k| String::from_utf8_lossy(k).into_owned()),
                payload: message.payload().map(<[u8]>::to_vec).unwrap_or_default(),
            })),
            Err(e) => Err(Error::Consume(format!("kafka receive failed: {}", e))),
        }
    }
}
