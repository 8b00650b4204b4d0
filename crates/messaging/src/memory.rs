//! Recording event publisher for tests.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, broadcast};

use crate::{BroadcastEventPublisher, EventMessage, EventPublisher, PublishError, Result};

#[derive(Debug, Default)]
struct InMemoryPublisherState {
    published: Vec<EventMessage>,
    fail_on_publish: bool,
}

/// Event publisher that records every accepted message.
///
/// Intended for tests: the log grows with every publish and is never
/// drained. Messages are also fanned out to broadcast subscribers.
/// Publication is serialized, so the log and every subscriber see messages
/// in the order `publish` accepted them. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEventPublisher {
    state: Arc<Mutex<InMemoryPublisherState>>,
    broadcast: BroadcastEventPublisher,
}

impl InMemoryEventPublisher {
    /// Creates a new recording publisher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes to all messages published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<EventMessage> {
        self.broadcast.subscribe()
    }

    /// Configures the publisher to reject messages with a transport error.
    pub async fn set_fail_on_publish(&self, fail: bool) {
        self.state.lock().await.fail_on_publish = fail;
    }

    /// Returns every accepted message in publication order.
    pub async fn published(&self) -> Vec<EventMessage> {
        self.state.lock().await.published.clone()
    }

    /// Returns the accepted messages for one partition key in publication order.
    pub async fn published_for(&self, partition_key: &str) -> Vec<EventMessage> {
        self.state
            .lock()
            .await
            .published
            .iter()
            .filter(|m| m.partition_key == partition_key)
            .cloned()
            .collect()
    }

    /// Returns the number of accepted messages.
    pub async fn message_count(&self) -> usize {
        self.state.lock().await.published.len()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventPublisher {
    async fn publish(&self, message: EventMessage) -> Result<()> {
        let mut state = self.state.lock().await;

        if state.fail_on_publish {
            return Err(PublishError::Transport(format!(
                "broker unavailable, {} not delivered",
                message.event_type
            )));
        }

        self.broadcast.publish(message.clone()).await?;
        state.published.push(message);

        Ok(())
    }
}
