use async_trait::async_trait;

use crate::{Order, OrderId, Result, Version};

/// Core trait for order store implementations.
///
/// The store owns physical storage of orders and the version token used for
/// optimistic concurrency. Every successful write bumps the version. The
/// version comparison in [`update_with_version_check`] and [`delete`] is
/// atomic with the write itself.
///
/// [`update_with_version_check`]: OrderStore::update_with_version_check
/// [`delete`]: OrderStore::delete
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Retrieves an order by id.
    ///
    /// Returns None if no order is stored under this id.
    async fn get(&self, id: &OrderId) -> Result<Option<Order>>;

    /// Retrieves all orders in insertion order.
    async fn list(&self) -> Result<Vec<Order>>;

    /// Inserts a new order.
    ///
    /// Fails with `Conflict` if the id is in use or was retired by a delete.
    /// Returns the committed order at [`Version::first`].
    async fn insert(&self, order: Order) -> Result<Order>;

    /// Replaces a stored order if its version still equals `expected`.
    ///
    /// The creation date of the stored record is kept. Fails with
    /// `VersionMismatch` if another writer got there first, or `NotFound` if
    /// the order is gone. Returns the committed order at `expected.next()`.
    async fn update_with_version_check(&self, order: Order, expected: Version) -> Result<Order>;

    /// Deletes a stored order if its version still equals `expected`.
    ///
    /// The id is retired and can never be inserted again.
    async fn delete(&self, id: &OrderId, expected: Version) -> Result<()>;
}

/// Extension trait providing convenience methods for order stores.
#[async_trait]
pub trait OrderStoreExt: OrderStore {
    /// Checks if an order is currently stored under this id.
    async fn exists(&self, id: &OrderId) -> Result<bool> {
        Ok(self.get(id).await?.is_some())
    }
}

// Blanket implementation for all OrderStore implementations
impl<T: OrderStore + ?Sized> OrderStoreExt for T {}
