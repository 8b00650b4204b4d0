//! Order domain events.

use chrono::{DateTime, Utc};
use common::{CorrelationId, Order, OrderId};
use serde::{Deserialize, Serialize};

use crate::event::DomainEvent;

/// Events published after a successful order state change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum OrderEvent {
    /// Order was submitted.
    OrderCreated(OrderCreatedData),

    /// Order details were changed.
    OrderUpdated(OrderUpdatedData),

    /// Order was completed.
    OrderCompleted(OrderCompletedData),

    /// Order was deleted.
    OrderCancelled(OrderCancelledData),
}

impl OrderEvent {
    /// Builds the `OrderCreated` event for a freshly stored order.
    pub fn created(correlation_id: CorrelationId, order: &Order) -> Self {
        OrderEvent::OrderCreated(OrderCreatedData {
            correlation_id,
            order_id: order.id.clone(),
            customer_id: order.customer_id.clone(),
            event_id: order.event_id.clone(),
            tickets_count: order.tickets_count,
        })
    }

    /// Builds the `OrderUpdated` event for a committed update.
    pub fn updated(correlation_id: CorrelationId, order: &Order) -> Self {
        OrderEvent::OrderUpdated(OrderUpdatedData {
            correlation_id,
            order_id: order.id.clone(),
            customer_id: order.customer_id.clone(),
            event_id: order.event_id.clone(),
            tickets_count: order.tickets_count,
        })
    }

    /// Builds the `OrderCompleted` event.
    pub fn completed(
        correlation_id: CorrelationId,
        order_id: OrderId,
        completed_date: DateTime<Utc>,
    ) -> Self {
        OrderEvent::OrderCompleted(OrderCompletedData {
            correlation_id,
            order_id,
            completed_date,
        })
    }

    /// Builds the `OrderCancelled` event.
    pub fn cancelled(
        correlation_id: CorrelationId,
        order_id: OrderId,
        reason: impl Into<String>,
    ) -> Self {
        OrderEvent::OrderCancelled(OrderCancelledData {
            correlation_id,
            order_id,
            reason: reason.into(),
        })
    }

    /// Returns the id of the order the event is about.
    pub fn order_id(&self) -> &OrderId {
        match self {
            OrderEvent::OrderCreated(data) => &data.order_id,
            OrderEvent::OrderUpdated(data) => &data.order_id,
            OrderEvent::OrderCompleted(data) => &data.order_id,
            OrderEvent::OrderCancelled(data) => &data.order_id,
        }
    }
}

impl DomainEvent for OrderEvent {
    fn event_type(&self) -> &'static str {
        match self {
            OrderEvent::OrderCreated(_) => "OrderCreated",
            OrderEvent::OrderUpdated(_) => "OrderUpdated",
            OrderEvent::OrderCompleted(_) => "OrderCompleted",
            OrderEvent::OrderCancelled(_) => "OrderCancelled",
        }
    }

    fn partition_key(&self) -> &str {
        self.order_id().as_str()
    }
}

/// Data for OrderCreated event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderCreatedData {
    pub correlation_id: CorrelationId,
    pub order_id: OrderId,
    pub customer_id: String,
    pub event_id: String,
    pub tickets_count: u32,
}

/// Data for OrderUpdated event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderUpdatedData {
    pub correlation_id: CorrelationId,
    pub order_id: OrderId,
    pub customer_id: String,
    pub event_id: String,
    pub tickets_count: u32,
}

/// Data for OrderCompleted event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderCompletedData {
    pub correlation_id: CorrelationId,
    pub order_id: OrderId,

    /// When the order was first completed.
    pub completed_date: DateTime<Utc>,
}

/// Data for OrderCancelled event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderCancelledData {
    pub correlation_id: CorrelationId,
    pub order_id: OrderId,
    pub reason: String,
}
