//! Welcome and health endpoints.

use axum::routing::get;
use axum::{Json, Router};
use cmyk_types::WelcomeMessage;
use serde_json::{Value, json};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::state::AppState;

pub const WELCOME: &str =
    "Welcome to the RGB to CMYK Converter API. Use the /convert-to-cmyk/ endpoint to convert images.";

#[derive(OpenApi)]
#[openapi(paths(get_root, get_health), components(schemas(WelcomeMessage)))]
pub struct RootApi;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(get_root))
        .route("/health", get(get_health))
}

/// Welcome message pointing at the conversion endpoint.
#[utoipa::path(
    get,
    path = "/",
    tag = "root",
    responses(
        (status = 200, description = "Welcome message", body = WelcomeMessage)
    )
)]
pub async fn get_root() -> Json<WelcomeMessage> {
    Json(WelcomeMessage {
        message: WELCOME.to_owned(),
    })
}

/// Heartbeat endpoint.
///
/// Returns `{"status": "ok", "version": "..."}` with HTTP 200.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Server is healthy", body = Value)
    )
)]
pub async fn get_health() -> Json<Value> {
    Json(json!({
        "status":  "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

// ── Tests ──────────────────────────────────────────────────────────────────────
