//! HTTP API server with observability for the order lifecycle service.
//!
//! Provides REST endpoints for submitting, updating, completing and deleting
//! orders, with structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, put};
use domain::OrderService;
use messaging::EventPublisher;
use metrics_exporter_prometheus::PrometheusHandle;
use order_store::OrderStore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::orders::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: OrderStore + 'static, P: EventPublisher + 'static>(
    state: Arc<AppState<S, P>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route(
            "/orders",
            get(routes::orders::list::<S, P>)
                .post(routes::orders::submit::<S, P>)
                .put(routes::orders::update::<S, P>),
        )
        .route("/orders/complete", put(routes::orders::complete::<S, P>))
        .route(
            "/orders/{id}",
            get(routes::orders::get::<S, P>).delete(routes::orders::delete::<S, P>),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the application state around a store and an event publisher.
pub fn create_state<S: OrderStore + 'static, P: EventPublisher + 'static>(
    store: S,
    publisher: P,
) -> Arc<AppState<S, P>> {
    Arc::new(AppState {
        order_service: OrderService::new(store, publisher),
    })
}
