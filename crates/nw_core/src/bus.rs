use crate::Result;
use async_trait::async_trait;

/// One delivered bus record. For articles the key is the UTF-8 article id
/// and the payload is the article serialized as JSON.
#[derive(Debug, Clone)]
pub struct BusMessage {
    pub key: Option<String>,
    pub payload: Vec<u8>,
}

#[async_trait]
pub trait BusPublisher: Send + Sync {
    /// Send one keyed record to the configured topic.
    async fn send(&self, key: &str, payload: Vec<u8>) -> Result<()>;
}

#[async_trait]
pub trait BusSubscriber: Send + Sync {
    /// Waits for the next record. `Ok(None)` means the bus has closed and
    /// no further messages will arrive.
    async fn next_message(&mut self) -> Result<Option<BusMessage>>;
}
