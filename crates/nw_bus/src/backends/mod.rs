pub mod memory;

#[cfg(feature = "kafka")]
pub mod kafka;

pub use memory::MemoryBus;

#[cfg(feature = "kafka")]
pub use kafka::{KafkaPublisher, KafkaSubscriber};
