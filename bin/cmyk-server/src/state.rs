//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use crate::config::Config;
use crate::store::JobStore;

/// State shared across all HTTP handlers. Holds no per-job data.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Server configuration (env-derived).
    pub config: Arc<Config>,
    /// Upload / output directory layout.
    pub store: Arc<JobStore>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let store = JobStore::new(config.upload_dir.clone(), config.output_dir.clone());
        Self {
            config: Arc::new(config),
            store: Arc::new(store),
        }
    }
}
