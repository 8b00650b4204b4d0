use thiserror::Error;

use crate::{OrderId, Version};

/// Errors that can occur when interacting with the order store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No order is stored under this id.
    #[error("Order not found: {0}")]
    NotFound(OrderId),

    /// An order with this id exists, or existed and was deleted.
    #[error("Order already exists: {0}")]
    Conflict(OrderId),

    /// The stored version did not match the expected version.
    #[error("Version mismatch for order {order_id}: expected version {expected}, found {actual}")]
    VersionMismatch {
        order_id: OrderId,
        expected: Version,
        actual: Version,
    },

    /// A stored row could not be mapped back to an order.
    #[error("Corrupt order record {order_id}: {reason}")]
    CorruptRecord { order_id: String, reason: String },

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Result type for order store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
