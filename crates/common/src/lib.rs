//! Shared types for the order lifecycle service.

mod order;
mod types;
mod version;

pub use order::{Order, OrderStatus};
pub use types::{CorrelationId, OrderId};
pub use version::Version;
