//! Order service enforcing the order lifecycle.

use chrono::{DateTime, Utc};
use common::{Order, OrderId, OrderStatus, Version};
use messaging::EventPublisher;
use order_store::{OrderStore, OrderStoreExt, StoreError};

use crate::context::RequestContext;
use crate::error::{OrderError, Result};
use crate::event::DomainEvent;

use super::{Command, CompleteOrder, DeleteOrder, OrderEvent, SubmitOrder, UpdateOrder};

/// Service for managing orders.
///
/// Every state-changing operation writes to the store first and publishes
/// exactly one event once the write has committed. A write that fails
/// publishes nothing. A publish that fails after a committed write is
/// reported as [`OrderError::Publish`] and the write is kept: there is no
/// transactional outbox between the two.
///
/// Writes are guarded by the store's version check. Conflicts are reported
/// to the caller and never retried here.
pub struct OrderService<S: OrderStore, P: EventPublisher> {
    store: S,
    publisher: P,
}

impl<S: OrderStore, P: EventPublisher> OrderService<S, P> {
    /// Creates a new order service on the given store and publisher.
    pub fn new(store: S, publisher: P) -> Self {
        Self { store, publisher }
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns a reference to the underlying publisher.
    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    /// Loads an order by ID.
    #[tracing::instrument(skip(self, ctx), fields(correlation_id = %ctx.correlation_id))]
    pub async fn get_order(&self, ctx: &RequestContext, order_id: &OrderId) -> Result<Order> {
        self.load(order_id).await
    }

    /// Lists all orders in insertion order.
    #[tracing::instrument(skip(self, ctx), fields(correlation_id = %ctx.correlation_id))]
    pub async fn list_orders(&self, ctx: &RequestContext) -> Result<Vec<Order>> {
        Ok(self.store.list().await?)
    }

    /// Submits a new order.
    #[tracing::instrument(skip(self, ctx), fields(correlation_id = %ctx.correlation_id))]
    pub async fn submit_order(&self, ctx: &RequestContext, cmd: SubmitOrder) -> Result<Order> {
        require_id(&cmd)?;
        tracing::info!(order_id = %cmd.order_id, "submitting order");

        let now = Utc::now();
        let order = Order {
            id: cmd.order_id,
            customer_id: cmd.customer_id,
            event_id: cmd.event_id,
            tickets_count: cmd.tickets_count,
            status: OrderStatus::Created,
            created_date: now,
            last_updated_date: now,
            completed_date: None,
            version: Version::initial(),
        };

        let committed = self.store.insert(order).await.map_err(|e| match e {
            StoreError::Conflict(id) => OrderError::Conflict(id),
            other => other.into(),
        })?;
        metrics::counter!("orders_submitted_total").increment(1);

        self.emit(ctx, OrderEvent::created(ctx.correlation_id, &committed))
            .await?;
        Ok(committed)
    }

    /// Changes the details of an order.
    #[tracing::instrument(skip(self, ctx), fields(correlation_id = %ctx.correlation_id))]
    pub async fn update_order(&self, ctx: &RequestContext, cmd: UpdateOrder) -> Result<Order> {
        require_id(&cmd)?;
        tracing::info!(order_id = %cmd.order_id, "updating order");

        let current = self.load(&cmd.order_id).await?;
        if !current.status.can_update() {
            return Err(invalid_transition(&current, "update"));
        }

        let expected = cmd.expected_version.unwrap_or(current.version);
        let last_updated_date = touched_at(&current);
        let order = Order {
            customer_id: cmd.customer_id.unwrap_or(current.customer_id),
            event_id: cmd.event_id.unwrap_or(current.event_id),
            tickets_count: cmd.tickets_count.unwrap_or(current.tickets_count),
            status: OrderStatus::Updated,
            last_updated_date,
            ..current
        };

        let committed = self.write(order, expected).await?;
        metrics::counter!("orders_updated_total").increment(1);

        self.emit(ctx, OrderEvent::updated(ctx.correlation_id, &committed))
            .await?;
        Ok(committed)
    }

    /// Completes an order.
    ///
    /// Completing an already completed order persists no field changes and
    /// publishes `OrderCompleted` again with the original completion date.
    #[tracing::instrument(skip(self, ctx), fields(correlation_id = %ctx.correlation_id))]
    pub async fn complete_order(&self, ctx: &RequestContext, cmd: CompleteOrder) -> Result<Order> {
        require_id(&cmd)?;
        tracing::info!(order_id = %cmd.order_id, "completing order");

        let current = self.load(&cmd.order_id).await?;
        if !current.status.can_complete() {
            return Err(invalid_transition(&current, "complete"));
        }

        let expected = cmd.expected_version.unwrap_or(current.version);
        let order = match current.completed_date {
            Some(_) => current,
            None => {
                let now = touched_at(&current);
                Order {
                    status: OrderStatus::Completed,
                    completed_date: Some(now),
                    last_updated_date: now,
                    ..current
                }
            }
        };

        let committed = self.write(order, expected).await?;
        metrics::counter!("orders_completed_total").increment(1);

        let completed_date = committed
            .completed_date
            .unwrap_or(committed.last_updated_date);
        let event = OrderEvent::completed(ctx.correlation_id, committed.id.clone(), completed_date);
        self.emit(ctx, event).await?;
        Ok(committed)
    }

    /// Deletes an order and retires its id.
    #[tracing::instrument(skip(self, ctx), fields(correlation_id = %ctx.correlation_id))]
    pub async fn delete_order(&self, ctx: &RequestContext, cmd: DeleteOrder) -> Result<()> {
        require_id(&cmd)?;
        tracing::info!(order_id = %cmd.order_id, "deleting order");

        let current = self.load(&cmd.order_id).await?;
        if !current.status.can_cancel() {
            return Err(invalid_transition(&current, "delete"));
        }

        let expected = cmd.expected_version.unwrap_or(current.version);
        match self.store.delete(&cmd.order_id, expected).await {
            Ok(()) => {}
            Err(StoreError::NotFound(id)) => return Err(OrderError::NotFound(id)),
            Err(StoreError::VersionMismatch {
                order_id,
                expected,
                actual,
            }) => return Err(self.conflict_or_missing(order_id, expected, actual).await),
            Err(e) => return Err(e.into()),
        }
        metrics::counter!("orders_deleted_total").increment(1);

        let event = OrderEvent::cancelled(ctx.correlation_id, cmd.order_id, cmd.reason);
        self.emit(ctx, event).await
    }

    async fn load(&self, order_id: &OrderId) -> Result<Order> {
        self.store
            .get(order_id)
            .await?
            .ok_or_else(|| OrderError::NotFound(order_id.clone()))
    }

    /// Persists a modified order under the version check.
    async fn write(&self, order: Order, expected: Version) -> Result<Order> {
        match self.store.update_with_version_check(order, expected).await {
            Ok(committed) => Ok(committed),
            Err(StoreError::NotFound(id)) => Err(OrderError::NotFound(id)),
            Err(StoreError::VersionMismatch {
                order_id,
                expected,
                actual,
            }) => Err(self.conflict_or_missing(order_id, expected, actual).await),
            Err(e) => Err(e.into()),
        }
    }

    /// Classifies a failed version check: a vanished order is `NotFound`,
    /// anything else is a conflict for the caller to resolve.
    async fn conflict_or_missing(
        &self,
        order_id: OrderId,
        expected: Version,
        actual: Version,
    ) -> OrderError {
        match self.store.exists(&order_id).await {
            Ok(false) => OrderError::NotFound(order_id),
            Ok(true) => {
                metrics::counter!("order_concurrency_conflicts_total").increment(1);
                tracing::warn!(
                    order_id = %order_id,
                    expected = %expected,
                    actual = %actual,
                    "concurrency conflict"
                );
                OrderError::ConcurrencyConflict {
                    order_id,
                    expected,
                    actual,
                }
            }
            Err(e) => e.into(),
        }
    }

    async fn emit(&self, ctx: &RequestContext, event: OrderEvent) -> Result<()> {
        let event_type = event.event_type();
        let published = match event.to_message(ctx.correlation_id) {
            Ok(message) => self.publisher.publish(message).await,
            Err(e) => Err(e),
        };

        match published {
            Ok(()) => {
                metrics::counter!("order_events_published_total", "event_type" => event_type)
                    .increment(1);
                tracing::info!(order_id = %event.order_id(), event_type, "event published");
                Ok(())
            }
            Err(source) => {
                metrics::counter!("order_event_publish_failures_total", "event_type" => event_type)
                    .increment(1);
                tracing::error!(
                    order_id = %event.order_id(),
                    event_type,
                    error = %source,
                    "order saved but event not published"
                );
                Err(OrderError::Publish {
                    order_id: event.order_id().clone(),
                    event_type,
                    source,
                })
            }
        }
    }
}

fn require_id(cmd: &impl Command) -> Result<()> {
    if cmd.order_id().is_empty() {
        return Err(OrderError::InvalidArgument("Order id is required"));
    }
    Ok(())
}

fn invalid_transition(order: &Order, action: &'static str) -> OrderError {
    OrderError::InvalidTransition {
        order_id: order.id.clone(),
        status: order.status,
        action,
    }
}

/// Current time, never earlier than the order's creation date.
fn touched_at(order: &Order) -> DateTime<Utc> {
    Utc::now().max(order.created_date)
}
