use crate::app::AppState;
use crate::service::{self, InvocationEvent, InvocationResponse};
use axum::body::Body;
use axum::extract::State;
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use std::sync::Arc;

/// Handles the /status endpoint, returning a simple JSON status.
pub async fn status_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "ok"})))
}

/// Handles the /convert endpoint: adapts the HTTP request into an
/// invocation envelope, runs the converter, and maps the envelope back.
/// Method dispatch (POST/OPTIONS/405) lives in the handler itself.
pub async fn convert_handler(
    State(state): State<Arc<AppState>>,
    method: Method,
    body: String,
) -> Response {
    let event = InvocationEvent {
        http_method: method.as_str().to_string(),
        body,
    };

    into_http_response(service::handle(state, event).await)
}

fn into_http_response(response: InvocationResponse) -> Response {
    let status =
        StatusCode::from_u16(response.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let mut builder = Response::builder().status(status);
    for (name, value) in &response.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }

    builder
        .body(Body::from(response.body))
        .unwrap_or_else(|_| status.into_response())
}
