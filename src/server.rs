use crate::app::{AppState, Imgconvert};
use crate::constants::*;
use crate::handlers::{convert_handler, status_handler};
use axum::extract::Request;
use axum::routing::{any, get};
use axum::Router;
use rand::distr::Alphanumeric;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, info_span};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn generate_request_id() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(10)
        .map(char::from)
        .collect()
}

/// Builds the imgconvert router against the given state.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/status", get(status_handler))
        .route("/convert", any(convert_handler))
        .with_state(state)
}

pub async fn start() {
    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_env(ENV_LOG_LEVEL))
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let imgconvert = Imgconvert::from_env().expect("Failed to load config");
    let state = imgconvert.state();

    info!(
        "Starting imgconvert server with {} codec permits...",
        state.config.workers
    );

    let app = router(state.clone())
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<axum::body::Body>| {
                let request_id = generate_request_id();
                info_span!(
                    "request",
                    id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .layer(TimeoutLayer::new(Duration::from_secs(state.config.timeout)));

    let listener = TcpListener::bind(&state.config.bind_address).await.unwrap();
    info!("Listening on http://{}", &state.config.bind_address);

    axum::serve(listener, app).await.unwrap();
}
