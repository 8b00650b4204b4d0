use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{Order, OrderId, OrderStore, Result, StoreError, Version};

#[derive(Debug, Default)]
struct InMemoryState {
    orders: HashMap<OrderId, Order>,
    insertion_order: Vec<OrderId>,
    retired: HashSet<OrderId>,
}

/// In-memory order store.
///
/// All writes take the same write lock, which makes every version check a
/// compare-and-swap. Clones share the same underlying state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOrderStore {
    state: Arc<RwLock<InMemoryState>>,
}

impl InMemoryOrderStore {
    /// Creates a new empty in-memory order store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of orders currently stored.
    pub async fn order_count(&self) -> usize {
        self.state.read().await.orders.len()
    }

    /// Returns true if the id was retired by a delete.
    pub async fn is_retired(&self, id: &OrderId) -> bool {
        self.state.read().await.retired.contains(id)
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn get(&self, id: &OrderId) -> Result<Option<Order>> {
        Ok(self.state.read().await.orders.get(id).cloned())
    }

    async fn list(&self) -> Result<Vec<Order>> {
        let state = self.state.read().await;
        Ok(state
            .insertion_order
            .iter()
            .filter_map(|id| state.orders.get(id).cloned())
            .collect())
    }

    async fn insert(&self, mut order: Order) -> Result<Order> {
        let mut state = self.state.write().await;

        if state.orders.contains_key(&order.id) || state.retired.contains(&order.id) {
            return Err(StoreError::Conflict(order.id));
        }

        order.version = Version::first();
        state.insertion_order.push(order.id.clone());
        state.orders.insert(order.id.clone(), order.clone());

        Ok(order)
    }

    async fn update_with_version_check(&self, mut order: Order, expected: Version) -> Result<Order> {
        let mut state = self.state.write().await;

        let Some(current) = state.orders.get_mut(&order.id) else {
            return Err(StoreError::NotFound(order.id));
        };

        if current.version != expected {
            return Err(StoreError::VersionMismatch {
                order_id: order.id,
                expected,
                actual: current.version,
            });
        }

        order.created_date = current.created_date;
        order.version = expected.next();
        *current = order.clone();

        Ok(order)
    }

    async fn delete(&self, id: &OrderId, expected: Version) -> Result<()> {
        let mut state = self.state.write().await;

        let Some(current) = state.orders.get(id) else {
            return Err(StoreError::NotFound(id.clone()));
        };

        if current.version != expected {
            return Err(StoreError::VersionMismatch {
                order_id: id.clone(),
                expected,
                actual: current.version,
            });
        }

        state.orders.remove(id);
        state.insertion_order.retain(|stored| stored != id);
        state.retired.insert(id.clone());

        Ok(())
    }
}
