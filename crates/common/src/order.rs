use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{OrderId, Version};

/// The status of an order in its lifecycle.
///
/// Status transitions:
/// ```text
/// Created ──► Updated ──► Completed
///    │                       ▲
///    └───────────────────────┘
///
/// Created | Updated | Completed ──(delete)──► Cancelled
/// ```
///
/// `Updated` may be updated again and `Completed` may be completed again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    /// Order was submitted.
    #[default]
    Created,

    /// Order details were changed after submission.
    Updated,

    /// Order was completed.
    Completed,

    /// Order was deleted (terminal state).
    Cancelled,
}

impl OrderStatus {
    /// Returns true if the order details can be changed in this status.
    pub fn can_update(&self) -> bool {
        matches!(self, OrderStatus::Created | OrderStatus::Updated)
    }

    /// Returns true if the order can be completed in this status.
    ///
    /// Completing an already completed order is accepted and leaves it completed.
    pub fn can_complete(&self) -> bool {
        !matches!(self, OrderStatus::Cancelled)
    }

    /// Returns true if the order can be deleted in this status.
    pub fn can_cancel(&self) -> bool {
        !matches!(self, OrderStatus::Cancelled)
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Created => "Created",
            OrderStatus::Updated => "Updated",
            OrderStatus::Completed => "Completed",
            OrderStatus::Cancelled => "Cancelled",
        }
    }

    /// Parses a status from its name.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Created" => Some(OrderStatus::Created),
            "Updated" => Some(OrderStatus::Updated),
            "Completed" => Some(OrderStatus::Completed),
            "Cancelled" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A ticket order as persisted by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub customer_id: String,
    /// The ticketed event this order is for.
    pub event_id: String,
    pub tickets_count: u32,
    pub status: OrderStatus,
    pub created_date: DateTime<Utc>,
    pub last_updated_date: DateTime<Utc>,
    pub completed_date: Option<DateTime<Utc>>,
    /// Concurrency token maintained by the store.
    pub version: Version,
}
