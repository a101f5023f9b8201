//! Wires the admin and routing handlers into one `axum::Router`, sharing
//! state (`Fleet`, the driver, and an outbound HTTP client) across both
//! surfaces.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{delete, get, post};
use axum::Router;
use fleet::{ContainerDriver, Fleet};
use tower_http::trace::TraceLayer;

use crate::{admin, router};

/// Shared state every handler reads through. Cheap to clone: everything in
/// it is an `Arc`, a pooled HTTP client, or `Copy` configuration.
#[derive(Clone)]
pub struct AppState {
    pub fleet: Arc<Fleet>,
    pub driver: Arc<dyn ContainerDriver>,
    pub http: reqwest::Client,
    pub proxy_timeout: Duration,
    pub ring_slots: usize,
}

/// Build the full router: the three admin routes, registered before the
/// catch-all so they take precedence over it.
pub fn build(state: AppState) -> Router {
    Router::new()
        .route("/rep", get(admin::get_rep))
        .route("/add", post(admin::post_add))
        .route("/rm", delete(admin::delete_rm))
        .route("/{*path}", get(router::proxy))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
