//! Order commands.

use common::{OrderId, Version};

/// Reason recorded on `OrderCancelled` when the caller gives none.
pub const DEFAULT_CANCELLATION_REASON: &str = "Changed my mind";

/// Trait for commands that target a single order.
pub trait Command: Send + Sync {
    /// Returns the id of the order this command targets.
    fn order_id(&self) -> &OrderId;
}

/// Command to submit a new order.
#[derive(Debug, Clone)]
pub struct SubmitOrder {
    /// The order ID to create, chosen by the client.
    pub order_id: OrderId,

    /// The customer placing the order.
    pub customer_id: String,

    /// The ticketed event the order is for.
    pub event_id: String,

    /// Number of tickets ordered.
    pub tickets_count: u32,
}

impl SubmitOrder {
    /// Creates a new SubmitOrder command.
    pub fn new(
        order_id: impl Into<OrderId>,
        customer_id: impl Into<String>,
        event_id: impl Into<String>,
        tickets_count: u32,
    ) -> Self {
        Self {
            order_id: order_id.into(),
            customer_id: customer_id.into(),
            event_id: event_id.into(),
            tickets_count,
        }
    }
}

impl Command for SubmitOrder {
    fn order_id(&self) -> &OrderId {
        &self.order_id
    }
}

/// Command to change the details of an order.
///
/// Fields left as `None` keep their stored value.
#[derive(Debug, Clone)]
pub struct UpdateOrder {
    /// The order to update.
    pub order_id: OrderId,

    pub customer_id: Option<String>,

    pub event_id: Option<String>,

    pub tickets_count: Option<u32>,

    /// Version the caller last read. The stored version is used when absent.
    pub expected_version: Option<Version>,
}

impl UpdateOrder {
    /// Creates an UpdateOrder command that changes nothing yet.
    pub fn new(order_id: impl Into<OrderId>) -> Self {
        Self {
            order_id: order_id.into(),
            customer_id: None,
            event_id: None,
            tickets_count: None,
            expected_version: None,
        }
    }

    /// Sets a new customer.
    pub fn with_customer_id(mut self, customer_id: impl Into<String>) -> Self {
        self.customer_id = Some(customer_id.into());
        self
    }

    /// Sets a new ticketed event.
    pub fn with_event_id(mut self, event_id: impl Into<String>) -> Self {
        self.event_id = Some(event_id.into());
        self
    }

    /// Sets a new ticket count.
    pub fn with_tickets_count(mut self, tickets_count: u32) -> Self {
        self.tickets_count = Some(tickets_count);
        self
    }

    /// Requires the stored order to still be at `version`.
    pub fn expect_version(mut self, version: Version) -> Self {
        self.expected_version = Some(version);
        self
    }
}

impl Command for UpdateOrder {
    fn order_id(&self) -> &OrderId {
        &self.order_id
    }
}

/// Command to complete an order.
#[derive(Debug, Clone)]
pub struct CompleteOrder {
    /// The order to complete.
    pub order_id: OrderId,

    /// Version the caller last read. The stored version is used when absent.
    pub expected_version: Option<Version>,
}

impl CompleteOrder {
    /// Creates a new CompleteOrder command.
    pub fn new(order_id: impl Into<OrderId>) -> Self {
        Self {
            order_id: order_id.into(),
            expected_version: None,
        }
    }

    /// Requires the stored order to still be at `version`.
    pub fn expect_version(mut self, version: Version) -> Self {
        self.expected_version = Some(version);
        self
    }
}

impl Command for CompleteOrder {
    fn order_id(&self) -> &OrderId {
        &self.order_id
    }
}

/// Command to delete (cancel) an order.
#[derive(Debug, Clone)]
pub struct DeleteOrder {
    /// The order to delete.
    pub order_id: OrderId,

    /// Why the order is cancelled.
    pub reason: String,

    /// Version the caller last read. The stored version is used when absent.
    pub expected_version: Option<Version>,
}

impl DeleteOrder {
    /// Creates a DeleteOrder command with the default reason.
    pub fn new(order_id: impl Into<OrderId>) -> Self {
        Self {
            order_id: order_id.into(),
            reason: DEFAULT_CANCELLATION_REASON.to_string(),
            expected_version: None,
        }
    }

    /// Sets the cancellation reason.
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    /// Requires the stored order to still be at `version`.
    pub fn expect_version(mut self, version: Version) -> Self {
        self.expected_version = Some(version);
        self
    }
}

impl Command for DeleteOrder {
    fn order_id(&self) -> &OrderId {
        &self.order_id
    }
}
