//! Broadcast-only event publisher.

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::{EventMessage, EventPublisher, Result};

/// Number of messages a subscriber may fall behind before it starts lagging.
pub const DEFAULT_CAPACITY: usize = 1024;

/// Event publisher that fans messages out to live subscribers and keeps
/// nothing else.
///
/// Memory is bounded by the channel capacity: a subscriber that falls more
/// than `capacity` messages behind skips the oldest ones. Publishing with no
/// subscribers succeeds and drops the message.
#[derive(Debug, Clone)]
pub struct BroadcastEventPublisher {
    sender: broadcast::Sender<EventMessage>,
}

impl BroadcastEventPublisher {
    /// Creates a publisher with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates a publisher whose subscribers buffer up to `capacity` messages.
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribes to all messages published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<EventMessage> {
        self.sender.subscribe()
    }
}

impl Default for BroadcastEventPublisher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for BroadcastEventPublisher {
    async fn publish(&self, message: EventMessage) -> Result<()> {
        let event_type = message.event_type.clone();
        let partition_key = message.partition_key.clone();

        // No live subscribers is not a failure.
        let receivers = self.sender.send(message).unwrap_or(0);
        tracing::debug!(%event_type, %partition_key, receivers, "event published");

        Ok(())
    }
}
