//! Integration tests for the admin API surface, driven end-to-end through
//! the `axum::Router` with a `FakeDriver` standing in for containers.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use fleet::{ContainerDriver, FakeDriver, Fleet};
use gateway::AppState;
use serde_json::{json, Value};
use tower::ServiceExt;

fn test_state(fleet: Arc<Fleet>, driver: Arc<dyn ContainerDriver>) -> AppState {
    AppState {
        fleet,
        driver,
        http: reqwest::Client::new(),
        proxy_timeout: Duration::from_secs(1),
        ring_slots: 256,
    }
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn rep_reports_empty_fleet() {
    let fleet = Fleet::new(256, 16).unwrap();
    let driver: Arc<dyn ContainerDriver> = Arc::new(FakeDriver::new());
    let app = gateway::build(test_state(fleet, driver));

    let response = app
        .oneshot(Request::get("/rep").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["message"]["N"], 0);
    assert_eq!(body["status"], "successful");
}

#[tokio::test]
async fn add_with_hostnames_grows_fleet_to_requested_size() {
    let fleet = Fleet::new(256, 16).unwrap();
    let driver: Arc<dyn ContainerDriver> = Arc::new(FakeDriver::new());
    let app = gateway::build(test_state(fleet, driver));

    let req = Request::post("/add")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({"n": 2, "hostnames": ["A", "B"]}).to_string(),
        ))
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["message"]["N"], 2);
    let replicas: Vec<String> = body["message"]["replicas"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect();
    assert!(replicas.contains(&"A".to_string()));
    assert!(replicas.contains(&"B".to_string()));
}

#[tokio::test]
async fn add_with_too_many_hostnames_is_rejected() {
    let fleet = Fleet::new(256, 16).unwrap();
    let driver: Arc<dyn ContainerDriver> = Arc::new(FakeDriver::new());
    let app = gateway::build(test_state(fleet, driver));

    let req = Request::post("/add")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({"n": 1, "hostnames": ["A", "B"]}).to_string(),
        ))
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["status"], "failure");
    assert!(body["message"].as_str().unwrap().contains("<Error>"));
    assert!(body["message"].as_str().unwrap().contains("hostname"));
}

#[tokio::test]
async fn rm_by_name_with_random_fill_hits_target_size() {
    let fleet = Fleet::new(256, 16).unwrap();
    let driver: Arc<dyn ContainerDriver> = Arc::new(FakeDriver::new());
    for name in ["A", "B", "C", "D"] {
        driver.spawn(name).await.unwrap();
        fleet.try_insert(ringcore::BackendId::new(name).unwrap());
    }
    let app = gateway::build(test_state(fleet.clone(), driver));

    let req = Request::delete("/rm")
        .header("content-type", "application/json")
        .body(Body::from(json!({"n": 3, "hostnames": ["A"]}).to_string()))
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["message"]["N"], 1);
    assert!(!fleet.contains(&ringcore::BackendId::new("A").unwrap()));
}

#[tokio::test]
async fn proxy_with_no_backends_returns_500() {
    let fleet = Fleet::new(256, 16).unwrap();
    let driver: Arc<dyn ContainerDriver> = Arc::new(FakeDriver::new());
    let app = gateway::build(test_state(fleet, driver));

    let response = app
        .oneshot(Request::get("/home").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["status"], "failure");
    assert!(body["message"].as_str().unwrap().contains("No servers available"));
}
