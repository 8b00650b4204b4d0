//! Order lifecycle endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use domain::{
    CompleteOrder, CorrelationId, DeleteOrder, Order, OrderId, OrderService, RequestContext,
    SubmitOrder, UpdateOrder, Version,
};
use messaging::EventPublisher;
use order_store::OrderStore;
use serde::Deserialize;

use crate::error::ApiError;

/// Header carrying the caller's correlation id.
pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";

/// Shared application state accessible from all handlers.
pub struct AppState<S: OrderStore, P: EventPublisher> {
    pub order_service: OrderService<S, P>,
}

// -- Request types --

#[derive(Debug, Deserialize)]
pub struct SubmitOrderRequest {
    pub id: String,
    pub customer_id: String,
    pub event_id: String,
    pub tickets_count: u32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateOrderRequest {
    pub id: String,
    pub customer_id: Option<String>,
    pub event_id: Option<String>,
    pub tickets_count: Option<u32>,
    pub expected_version: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CompleteOrderRequest {
    pub id: String,
    pub expected_version: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteOrderParams {
    pub reason: Option<String>,
    pub expected_version: Option<i64>,
}

// -- Handlers --

/// GET /orders: list all orders.
#[tracing::instrument(skip(state, headers))]
pub async fn list<S: OrderStore + 'static, P: EventPublisher + 'static>(
    State(state): State<Arc<AppState<S, P>>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Order>>, ApiError> {
    let ctx = request_context(&headers);
    let orders = state.order_service.list_orders(&ctx).await?;
    Ok(Json(orders))
}

/// GET /orders/{id}: load one order.
#[tracing::instrument(skip(state, headers))]
pub async fn get<S: OrderStore + 'static, P: EventPublisher + 'static>(
    State(state): State<Arc<AppState<S, P>>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Order>, ApiError> {
    let ctx = request_context(&headers);
    let order = state
        .order_service
        .get_order(&ctx, &OrderId::new(id))
        .await?;
    Ok(Json(order))
}

/// POST /orders: submit a new order.
#[tracing::instrument(skip(state, headers, payload), fields(order_id = tracing::field::Empty))]
pub async fn submit<S: OrderStore + 'static, P: EventPublisher + 'static>(
    State(state): State<Arc<AppState<S, P>>>,
    headers: HeaderMap,
    payload: Result<Json<SubmitOrderRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Order>), ApiError> {
    let Json(req) = payload?;
    tracing::Span::current().record("order_id", req.id.as_str());
    let ctx = request_context(&headers);
    let cmd = SubmitOrder::new(req.id, req.customer_id, req.event_id, req.tickets_count);
    let order = state.order_service.submit_order(&ctx, cmd).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// PUT /orders: change the details of an order.
#[tracing::instrument(skip(state, headers, payload), fields(order_id = tracing::field::Empty))]
pub async fn update<S: OrderStore + 'static, P: EventPublisher + 'static>(
    State(state): State<Arc<AppState<S, P>>>,
    headers: HeaderMap,
    payload: Result<Json<UpdateOrderRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(req) = payload?;
    tracing::Span::current().record("order_id", req.id.as_str());
    let ctx = request_context(&headers);

    let mut cmd = UpdateOrder::new(req.id);
    if let Some(customer_id) = req.customer_id {
        cmd = cmd.with_customer_id(customer_id);
    }
    if let Some(event_id) = req.event_id {
        cmd = cmd.with_event_id(event_id);
    }
    if let Some(tickets_count) = req.tickets_count {
        cmd = cmd.with_tickets_count(tickets_count);
    }
    if let Some(version) = req.expected_version {
        cmd = cmd.expect_version(Version::new(version));
    }

    state.order_service.update_order(&ctx, cmd).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /orders/complete: complete an order.
#[tracing::instrument(skip(state, headers, payload), fields(order_id = tracing::field::Empty))]
pub async fn complete<S: OrderStore + 'static, P: EventPublisher + 'static>(
    State(state): State<Arc<AppState<S, P>>>,
    headers: HeaderMap,
    payload: Result<Json<CompleteOrderRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(req) = payload?;
    tracing::Span::current().record("order_id", req.id.as_str());
    let ctx = request_context(&headers);

    let mut cmd = CompleteOrder::new(req.id);
    if let Some(version) = req.expected_version {
        cmd = cmd.expect_version(Version::new(version));
    }

    state.order_service.complete_order(&ctx, cmd).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /orders/{id}: delete an order, optionally with `?reason=`.
#[tracing::instrument(skip(state, headers, params))]
pub async fn delete<S: OrderStore + 'static, P: EventPublisher + 'static>(
    State(state): State<Arc<AppState<S, P>>>,
    Path(id): Path<String>,
    params: Result<Query<DeleteOrderParams>, QueryRejection>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let Query(params) = params?;
    let ctx = request_context(&headers);

    let mut cmd = DeleteOrder::new(id);
    if let Some(reason) = params.reason.filter(|r| !r.trim().is_empty()) {
        cmd = cmd.with_reason(reason);
    }
    if let Some(version) = params.expected_version {
        cmd = cmd.expect_version(Version::new(version));
    }

    state.order_service.delete_order(&ctx, cmd).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Builds the request context from the correlation header.
///
/// A missing or malformed header gets a fresh correlation id.
fn request_context(headers: &HeaderMap) -> RequestContext {
    let supplied = headers
        .get(CORRELATION_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(CorrelationId::parse);

    match supplied {
        Some(correlation_id) => RequestContext::with_correlation_id(correlation_id),
        None => RequestContext::new(),
    }
}
