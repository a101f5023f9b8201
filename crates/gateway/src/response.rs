//! The `{ message, status }` envelope shared by every admin response, so
//! the success and `<Error>`-prefixed failure shapes can't drift from each
//! other across the three admin handlers.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Message {
    Rep { #[serde(rename = "N")] n: usize, replicas: Vec<String> },
    Text(String),
}

#[derive(Debug, Serialize)]
pub struct AdminResponse {
    pub message: Message,
    pub status: &'static str,
    #[serde(skip)]
    pub code: StatusCode,
}

impl AdminResponse {
    pub fn success(message: Message) -> Self {
        Self {
            message,
            status: "successful",
            code: StatusCode::OK,
        }
    }

    pub fn failure(code: StatusCode, text: impl Into<String>) -> Self {
        Self {
            message: Message::Text(text.into()),
            status: "failure",
            code,
        }
    }
}

impl IntoResponse for AdminResponse {
    fn into_response(self) -> Response {
        let code = self.code;
        (code, Json(self)).into_response()
    }
}
