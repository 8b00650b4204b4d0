//! Domain error types.

use common::{OrderId, OrderStatus, Version};
use messaging::PublishError;
use order_store::StoreError;
use thiserror::Error;

/// Errors returned by the order service.
///
/// Everything except `Store` is an expected business outcome. `Store` carries
/// storage faults the service cannot interpret.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The request was malformed, e.g. the order id was empty.
    #[error("Invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// No order is stored under this id.
    #[error("Order not found: {0}")]
    NotFound(OrderId),

    /// An order with this id already exists or existed before.
    #[error("Order {0} already exists")]
    Conflict(OrderId),

    /// Another writer changed the order since it was read.
    #[error(
        "Concurrency conflict for order {order_id}: expected version {expected}, found {actual}"
    )]
    ConcurrencyConflict {
        order_id: OrderId,
        expected: Version,
        actual: Version,
    },

    /// The order's status does not allow the requested action.
    #[error("Invalid state transition: cannot {action} order {order_id} in {status} state")]
    InvalidTransition {
        order_id: OrderId,
        status: OrderStatus,
        action: &'static str,
    },

    /// The change was saved but its event could not be published.
    #[error("Order {order_id} was saved but {event_type} was not published: {source}")]
    Publish {
        order_id: OrderId,
        event_type: &'static str,
        #[source]
        source: PublishError,
    },

    /// An unexpected storage fault.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Result type for order service operations.
pub type Result<T> = std::result::Result<T, OrderError>;
