//! Order persistence for the order lifecycle service.
//!
//! Stores are keyed by order id and guard every write with a version token
//! (optimistic concurrency). Two implementations are provided:
//! - [`InMemoryOrderStore`] for tests and single-process deployments
//! - [`PostgresOrderStore`] for durable storage

pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;

pub use common::{Order, OrderId, OrderStatus, Version};
pub use error::{Result, StoreError};
pub use memory::InMemoryOrderStore;
pub use postgres::PostgresOrderStore;
pub use store::{OrderStore, OrderStoreExt};
