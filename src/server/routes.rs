//! HTTP endpoints
//!
//! - `POST /send` accepts a chat submission and broadcasts it
//! - `GET /events` opens a Server-Sent Events stream
//! - anything else is looked up under the static asset root

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{header, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;

use super::assets;
use crate::chat::ChatMessage;
use crate::registry::BroadcastRegistry;

/// Content type of the push stream
pub const EVENT_STREAM_CONTENT_TYPE: &str = "text/event-stream; charset=UTF-8";

/// Shared state for all handlers
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<BroadcastRegistry>,
    pub asset_root: Arc<PathBuf>,
}

impl AppState {
    pub fn new(registry: Arc<BroadcastRegistry>, asset_root: impl Into<PathBuf>) -> Self {
        Self {
            registry,
            asset_root: Arc::new(asset_root.into()),
        }
    }
}

/// Build the router
///
/// Non-POST requests to `/send` get `405 Method Not Allowed`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/send", post(send_message))
        .route("/events", get(subscribe_events))
        .fallback(serve_asset)
        .with_state(state)
}

/// POST /send
async fn send_message(State(state): State<AppState>, body: Bytes) -> &'static str {
    let body = String::from_utf8_lossy(&body);
    let line = ChatMessage::parse(&body).line();

    tracing::info!(line = %line, "Broadcast");
    state.registry.publish(&line).await;

    "OK"
}

/// GET /events
///
/// The response body is the subscriber's event stream. A watch task removes
/// the subscriber once the body is dropped.
async fn subscribe_events(State(state): State<AppState>) -> Response {
    let subscription = state.registry.subscribe().await;
    state
        .registry
        .spawn_disconnect_watch(Arc::clone(&subscription.connection));

    (
        [
            (header::CONTENT_TYPE, EVENT_STREAM_CONTENT_TYPE),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        Body::from_stream(subscription.events),
    )
        .into_response()
}

/// Everything else
async fn serve_asset(State(state): State<AppState>, uri: Uri) -> Response {
    match assets::load(&state.asset_root, uri.path()).await {
        Some(asset) => ([(header::CONTENT_TYPE, asset.content_type)], asset.bytes).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
