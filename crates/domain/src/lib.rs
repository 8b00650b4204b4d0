//! Domain layer for the order lifecycle service.
//!
//! This crate provides:
//! - Commands for submitting, updating, completing and deleting orders
//! - Order domain events and the DomainEvent trait
//! - OrderService, which couples each store write with one published event

pub mod context;
pub mod error;
pub mod event;
pub mod order;

pub use common::{CorrelationId, Order, OrderId, OrderStatus, Version};
pub use context::RequestContext;
pub use error::{OrderError, Result};
pub use event::DomainEvent;
pub use order::{
    Command, CompleteOrder, DEFAULT_CANCELLATION_REASON, DeleteOrder, OrderCancelledData,
    OrderCompletedData, OrderCreatedData, OrderEvent, OrderService, OrderUpdatedData, SubmitOrder,
    UpdateOrder,
};
