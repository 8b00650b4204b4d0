//! Order commands, events and the lifecycle service.

mod commands;
mod events;
mod service;

pub use commands::*;
pub use events::{
    OrderCancelledData, OrderCompletedData, OrderCreatedData, OrderEvent, OrderUpdatedData,
};
pub use service::OrderService;
