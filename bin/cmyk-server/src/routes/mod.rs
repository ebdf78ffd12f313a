//! Axum router construction.
//!
//! [`build`] assembles the complete application router, including:
//! - Middleware layers (CORS, per-request trace-ID injection)
//! - Welcome and health routes
//! - Convert, download and view routes
//! - Static serving of the output directory under `/view-images`
//! - Optional OpenAPI document (disable with `CMYK_ENABLE_DOCS=false`)

mod convert;
pub mod doc;
mod files;
mod root;

use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    middleware::{self},
    routing::get,
};
use crate::middleware::{cors, trace};
use crate::state::AppState;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::services::ServeDir;

// ── Router builder ────────────────────────────────────────────────────────────

/// Build the complete Axum [`Router`] for the application.
pub fn build(state: Arc<AppState>) -> Router {
    let mut app = Router::new()
        .merge(root::router())
        .merge(convert::router())
        .merge(files::router())
        .nest_service("/view-images", ServeDir::new(state.store.output_dir()));

    if state.config.enable_docs {
        let api_doc = doc::get_docs();
        app = app.route(
            "/api-docs/openapi.json",
            get(move || {
                let api_doc = api_doc.clone();
                async move { Json(api_doc) }
            }),
        );
    }

    app
        // Uploads are not size limited.
        .layer(DefaultBodyLimit::disable())
        // Outermost layers execute first on the way in.
        .layer(ServiceBuilder::new().layer(cors::cors_layer(&state)))
        .layer(middleware::from_fn(trace::trace_middleware))
        .with_state(state)
}
