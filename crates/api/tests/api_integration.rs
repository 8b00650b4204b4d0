//! Integration tests for the API server.

use std::sync::OnceLock;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use domain::{CorrelationId, OrderEvent};
use messaging::{BroadcastEventPublisher, InMemoryEventPublisher};
use metrics_exporter_prometheus::PrometheusHandle;
use order_store::InMemoryOrderStore;
use serde_json::{Value, json};
use tower::ServiceExt;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

fn setup() -> (axum::Router, InMemoryEventPublisher) {
    let publisher = InMemoryEventPublisher::new();
    let state = api::create_state(InMemoryOrderStore::new(), publisher.clone());
    let app = api::create_app(state, get_metrics_handle());
    (app, publisher)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn send(app: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

async fn submit(app: &axum::Router, id: &str) -> (StatusCode, Value) {
    send(
        app,
        json_request(
            "POST",
            "/orders",
            json!({
                "id": id,
                "customer_id": "C1",
                "event_id": "E1",
                "tickets_count": 2
            }),
        ),
    )
    .await
}

#[tokio::test]
async fn test_health_check() {
    let (app, _) = setup();

    let (status, json) = send(&app, empty_request("GET", "/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_submit_order() {
    let (app, publisher) = setup();

    let (status, json) = submit(&app, "O1").await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["id"], "O1");
    assert_eq!(json["status"], "Created");
    assert_eq!(json["tickets_count"], 2);
    assert_eq!(json["version"], 1);
    assert_eq!(json["created_date"], json["last_updated_date"]);
    assert!(json["completed_date"].is_null());
    assert_eq!(publisher.message_count().await, 1);
}

#[tokio::test]
async fn test_submit_and_get_order() {
    let (app, _) = setup();
    submit(&app, "O1").await;

    let (status, json) = send(&app, empty_request("GET", "/orders/O1")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["customer_id"], "C1");
    assert_eq!(json["event_id"], "E1");
}

#[tokio::test]
async fn test_get_missing_order_returns_404() {
    let (app, _) = setup();

    let (status, json) = send(&app, empty_request("GET", "/orders/missing")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["error"].as_str().unwrap().contains("missing"));
}

#[tokio::test]
async fn test_submit_duplicate_returns_409() {
    let (app, publisher) = setup();
    submit(&app, "O1").await;

    let (status, _) = submit(&app, "O1").await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(publisher.message_count().await, 1);
}

#[tokio::test]
async fn test_submit_empty_id_returns_400() {
    let (app, publisher) = setup();

    let (status, json) = submit(&app, "").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().is_some());
    assert_eq!(publisher.message_count().await, 0);
}

#[tokio::test]
async fn test_submit_without_id_returns_400_json() {
    let (app, publisher) = setup();

    let (status, json) = send(
        &app,
        json_request(
            "POST",
            "/orders",
            json!({ "customer_id": "C1", "event_id": "E1", "tickets_count": 2 }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("id"));
    assert_eq!(publisher.message_count().await, 0);
}

#[tokio::test]
async fn test_submit_negative_tickets_count_returns_400_json() {
    let (app, _) = setup();

    let (status, json) = send(
        &app,
        json_request(
            "POST",
            "/orders",
            json!({ "id": "O1", "customer_id": "C1", "event_id": "E1", "tickets_count": -1 }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_update_with_malformed_body_returns_400_json() {
    let (app, _) = setup();
    submit(&app, "O1").await;

    let request = Request::builder()
        .method("PUT")
        .uri("/orders")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, json) = send(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_delete_with_malformed_version_returns_400_json() {
    let (app, _) = setup();
    submit(&app, "O1").await;

    let (status, json) = send(
        &app,
        empty_request("DELETE", "/orders/O1?expected_version=abc"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].is_string());

    let (status, _) = send(&app, empty_request("GET", "/orders/O1")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_list_orders() {
    let (app, _) = setup();
    submit(&app, "O1").await;
    submit(&app, "O2").await;

    let (status, json) = send(&app, empty_request("GET", "/orders")).await;

    assert_eq!(status, StatusCode::OK);
    let orders = json.as_array().unwrap();
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0]["id"], "O1");
    assert_eq!(orders[1]["id"], "O2");
}

#[tokio::test]
async fn test_update_order() {
    let (app, _) = setup();
    submit(&app, "O1").await;

    let (status, json) = send(
        &app,
        json_request("PUT", "/orders", json!({ "id": "O1", "tickets_count": 3 })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(json.is_null());

    let (_, order) = send(&app, empty_request("GET", "/orders/O1")).await;
    assert_eq!(order["status"], "Updated");
    assert_eq!(order["tickets_count"], 3);
    assert_eq!(order["customer_id"], "C1");
    assert_eq!(order["version"], 2);
}

#[tokio::test]
async fn test_update_missing_order_returns_404() {
    let (app, _) = setup();

    let (status, _) = send(
        &app,
        json_request("PUT", "/orders", json!({ "id": "missing", "tickets_count": 3 })),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_with_stale_version_returns_409() {
    let (app, _) = setup();
    submit(&app, "O1").await;
    send(
        &app,
        json_request("PUT", "/orders", json!({ "id": "O1", "tickets_count": 3 })),
    )
    .await;

    let (status, _) = send(
        &app,
        json_request(
            "PUT",
            "/orders",
            json!({ "id": "O1", "tickets_count": 4, "expected_version": 1 }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);

    let (_, order) = send(&app, empty_request("GET", "/orders/O1")).await;
    assert_eq!(order["tickets_count"], 3);
}

#[tokio::test]
async fn test_complete_order() {
    let (app, _) = setup();
    submit(&app, "O1").await;

    let (status, _) = send(
        &app,
        json_request("PUT", "/orders/complete", json!({ "id": "O1" })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, order) = send(&app, empty_request("GET", "/orders/O1")).await;
    assert_eq!(order["status"], "Completed");
    assert!(order["completed_date"].is_string());
}

#[tokio::test]
async fn test_update_after_complete_returns_409() {
    let (app, _) = setup();
    submit(&app, "O1").await;
    send(
        &app,
        json_request("PUT", "/orders/complete", json!({ "id": "O1" })),
    )
    .await;

    let (status, _) = send(
        &app,
        json_request("PUT", "/orders", json!({ "id": "O1", "tickets_count": 5 })),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_delete_order_with_reason() {
    let (app, publisher) = setup();
    submit(&app, "O1").await;

    let (status, _) = send(
        &app,
        empty_request("DELETE", "/orders/O1?reason=Event%20postponed"),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, empty_request("GET", "/orders/O1")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let messages = publisher.published_for("O1").await;
    match messages.last().unwrap().payload_as::<OrderEvent>().unwrap() {
        OrderEvent::OrderCancelled(data) => assert_eq!(data.reason, "Event postponed"),
        other => panic!("expected OrderCancelled, got {other:?}"),
    }
}

#[tokio::test]
async fn test_delete_missing_order_returns_404() {
    let (app, _) = setup();

    let (status, _) = send(&app, empty_request("DELETE", "/orders/missing")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_resubmit_deleted_order_returns_409() {
    let (app, _) = setup();
    submit(&app, "O1").await;
    send(&app, empty_request("DELETE", "/orders/O1")).await;

    let (status, _) = submit(&app, "O1").await;

    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_correlation_header_reaches_events() {
    let (app, publisher) = setup();
    let correlation_id = CorrelationId::new();

    let request = Request::builder()
        .method("POST")
        .uri("/orders")
        .header("content-type", "application/json")
        .header("x-correlation-id", correlation_id.to_string())
        .body(Body::from(
            serde_json::to_string(&json!({
                "id": "O1",
                "customer_id": "C1",
                "event_id": "E1",
                "tickets_count": 2
            }))
            .unwrap(),
        ))
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::CREATED);

    let messages = publisher.published().await;
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].correlation_id, correlation_id);
}

#[tokio::test]
async fn test_publish_failure_returns_502() {
    let (app, publisher) = setup();
    submit(&app, "O1").await;
    publisher.set_fail_on_publish(true).await;

    let (status, json) = send(
        &app,
        json_request("PUT", "/orders", json!({ "id": "O1", "tickets_count": 3 })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(json["error"].as_str().unwrap().contains("OrderUpdated"));

    let (_, order) = send(&app, empty_request("GET", "/orders/O1")).await;
    assert_eq!(order["tickets_count"], 3);
}

#[tokio::test]
async fn test_full_lifecycle_events() {
    let (app, publisher) = setup();
    submit(&app, "O1").await;
    send(
        &app,
        json_request("PUT", "/orders", json!({ "id": "O1", "tickets_count": 3 })),
    )
    .await;
    send(
        &app,
        json_request("PUT", "/orders/complete", json!({ "id": "O1" })),
    )
    .await;
    send(&app, empty_request("DELETE", "/orders/O1")).await;

    let event_types: Vec<String> = publisher
        .published_for("O1")
        .await
        .into_iter()
        .map(|m| m.event_type)
        .collect();
    assert_eq!(
        event_types,
        vec![
            "OrderCreated",
            "OrderUpdated",
            "OrderCompleted",
            "OrderCancelled"
        ]
    );
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let (app, _) = setup();
    submit(&app, "O1").await;

    let response = app
        .oneshot(empty_request("GET", "/metrics"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("orders_submitted_total"));
}

#[tokio::test]
async fn test_broadcast_publisher_delivers_without_keeping_a_log() {
    let publisher = BroadcastEventPublisher::with_capacity(2);
    let mut subscriber = publisher.subscribe();
    let state = api::create_state(InMemoryOrderStore::new(), publisher);
    let app = api::create_app(state, get_metrics_handle());

    let (status, _) = submit(&app, "O1").await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = send(&app, empty_request("DELETE", "/orders/O1")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    assert_eq!(subscriber.recv().await.unwrap().event_type, "OrderCreated");
    assert_eq!(subscriber.recv().await.unwrap().event_type, "OrderCancelled");

    for i in 0..50 {
        let (status, _) = submit(&app, &format!("N{i}")).await;
        assert_eq!(status, StatusCode::CREATED);
    }
    let mut retained = 0;
    loop {
        match subscriber.try_recv() {
            Ok(_) => retained += 1,
            Err(tokio::sync::broadcast::error::TryRecvError::Lagged(_)) => continue,
            Err(_) => break,
        }
    }
    assert_eq!(retained, 2);
}
