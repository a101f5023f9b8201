//! Request router (component F): proxies arbitrary application GETs to
//! whichever backend the ring says owns the request's fingerprint.

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::fingerprint::next_fingerprint;
use crate::response::AdminResponse;
use crate::AppState;

/// `GET /{*path}`: the catch-all registered after the three admin routes.
pub async fn proxy(
    State(state): State<AppState>,
    Path(path): Path<String>,
    headers: HeaderMap,
) -> Response {
    let fingerprint = next_fingerprint(state.ring_slots);

    let backend = match state.fleet.lookup(fingerprint) {
        Some(id) => id,
        None => {
            return AdminResponse::failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                "<Error> No servers available",
            )
            .into_response();
        }
    };

    // The lock is already released: `lookup` returns an owned `BackendId`
    // and takes no guard with it.
    let url = format!("http://{}:5000/{}", backend.as_str(), path);
    let mut request = state.http.get(&url).timeout(state.proxy_timeout);
    for (name, value) in headers.iter() {
        if name == axum::http::header::HOST {
            continue;
        }
        request = request.header(name.clone(), value.clone());
    }

    match request.send().await {
        Ok(upstream) => forward(upstream).await,
        Err(err) => {
            tracing::debug!(path = %path, backend = %backend, error = %err, "proxy transport error");
            AdminResponse::failure(
                StatusCode::BAD_REQUEST,
                format!("<Error> '/{path}' endpoint does not exist in server replicas"),
            )
            .into_response()
        }
    }
}

async fn forward(upstream: reqwest::Response) -> Response {
    let status = upstream.status();
    let headers = upstream.headers().clone();
    let body = match upstream.bytes().await {
        Ok(bytes) => bytes,
        Err(_) => return StatusCode::BAD_GATEWAY.into_response(),
    };

    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}
