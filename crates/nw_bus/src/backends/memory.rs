use async_trait::async_trait;
use nw_core::{BusMessage, BusPublisher, BusSubscriber, Error, Result};
use std::sync::Mutex;
use tokio::sync::mpsc;

/// In-process single-subscriber queue standing in for the broker. Used by
/// the single-process `run` mode and by tests; messages are not durable.
pub struct MemoryBus {
    tx: mpsc::UnboundedSender<BusMessage>,
    rx: Mutex<Option<mpsc::UnboundedReceiver<BusMessage>>>,
}

impl MemoryBus {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx: Mutex::new(Some(rx)),
        }
    }

    /// Takes the consuming end. The queue has exactly one subscriber;
    /// calling this twice is an error.
    pub fn subscribe(&self) -> Result<MemorySubscriber> {
        let mut slot = self
            .rx
            .lock()
            .map_err(|_| Error::Consume("in-memory bus lock poisoned".to_string()))?;
        slot.take()
            .map(|receiver| MemorySubscriber { receiver })
            .ok_or_else(|| Error::Consume("in-memory bus already has a subscriber".to_string()))
    }
}

impl Default for MemoryBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BusPublisher for MemoryBus {
    async fn send(&self, key: &str, payload: Vec<u8>) -> Result<()> {
        self.tx
            .send(BusMessage {
                key: Some(key.to_string()),
                payload,
            })
            .map_err(|_| Error::Publish("in-memory bus subscriber is gone".to_string()))
    }
}

pub struct MemorySubscriber {
    receiver: mpsc::UnboundedReceiver<BusMessage>,
}

#[async_trait]
impl BusSubscriber for MemorySubscriber {
    async fn next_message(&mut self) -> Result<Option<BusMessage>> {
        // None once every publisher handle has been dropped
        Ok(self.receiver.recv().await)
    }
}
