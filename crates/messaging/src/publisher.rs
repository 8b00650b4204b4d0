use async_trait::async_trait;

use crate::{EventMessage, Result};

/// Delivery channel for domain events.
///
/// Delivery is at least once: subscribers must tolerate duplicates and can
/// deduplicate on [`EventMessage::message_id`]. Messages sharing a partition
/// key are expected to reach a subscriber in publication order.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publishes a message, returning once the transport has accepted it.
    async fn publish(&self, message: EventMessage) -> Result<()>;
}
