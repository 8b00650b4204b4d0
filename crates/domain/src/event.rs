//! Domain event abstraction.

use common::CorrelationId;
use messaging::EventMessage;
use serde::Serialize;

/// A fact broadcast to subscribers after a state change.
pub trait DomainEvent: Serialize + Send + Sync {
    /// Returns the event type name (e.g., "OrderCreated").
    fn event_type(&self) -> &'static str;

    /// Returns the key that keeps events of one entity in order.
    fn partition_key(&self) -> &str;

    /// Wraps the event in a message for the publisher.
    fn to_message(&self, correlation_id: CorrelationId) -> messaging::Result<EventMessage>
    where
        Self: Sized,
    {
        EventMessage::builder()
            .event_type(self.event_type())
            .partition_key(self.partition_key())
            .correlation_id(correlation_id)
            .payload(self)?
            .build()
    }
}
