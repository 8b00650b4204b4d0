use chrono::{DateTime, Utc};
use common::CorrelationId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{PublishError, Result};

/// A domain event on its way to subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventMessage {
    /// Unique identifier of this message, for subscriber-side deduplication.
    pub message_id: Uuid,

    /// The type of the event (e.g., "OrderCreated").
    pub event_type: String,

    /// Key that orders messages for one originating entity, e.g. the order id.
    pub partition_key: String,

    /// Correlation id of the request that produced the event.
    pub correlation_id: CorrelationId,

    /// When the message was built.
    pub published_at: DateTime<Utc>,

    /// The event payload as JSON.
    pub payload: serde_json::Value,
}

impl EventMessage {
    /// Creates a new message builder.
    pub fn builder() -> EventMessageBuilder {
        EventMessageBuilder::default()
    }

    /// Deserializes the payload into a typed value.
    pub fn payload_as<T: for<'de> Deserialize<'de>>(&self) -> Result<T> {
        Ok(serde_json::from_value(self.payload.clone())?)
    }
}

/// Builder for constructing event messages.
#[derive(Debug, Default)]
pub struct EventMessageBuilder {
    event_type: Option<String>,
    partition_key: Option<String>,
    correlation_id: Option<CorrelationId>,
    payload: Option<serde_json::Value>,
}

impl EventMessageBuilder {
    /// Sets the event type.
    pub fn event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = Some(event_type.into());
        self
    }

    /// Sets the partition key.
    pub fn partition_key(mut self, key: impl Into<String>) -> Self {
        self.partition_key = Some(key.into());
        self
    }

    /// Sets the correlation ID.
    pub fn correlation_id(mut self, id: CorrelationId) -> Self {
        self.correlation_id = Some(id);
        self
    }

    /// Sets the payload from a serializable value.
    pub fn payload<T: Serialize>(mut self, payload: &T) -> Result<Self> {
        self.payload = Some(serde_json::to_value(payload)?);
        Ok(self)
    }

    /// Sets the payload from a raw JSON value.
    pub fn payload_raw(mut self, payload: serde_json::Value) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Builds the message, failing if a required field is missing.
    pub fn build(self) -> Result<EventMessage> {
        Ok(EventMessage {
            message_id: Uuid::new_v4(),
            event_type: self
                .event_type
                .ok_or(PublishError::MissingField("event_type"))?,
            partition_key: self
                .partition_key
                .ok_or(PublishError::MissingField("partition_key"))?,
            correlation_id: self
                .correlation_id
                .ok_or(PublishError::MissingField("correlation_id"))?,
            published_at: Utc::now(),
            payload: self.payload.ok_or(PublishError::MissingField("payload"))?,
        })
    }
}
