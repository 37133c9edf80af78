use std::sync::Arc;

use crate::config::Config;
use crate::store::ApplicationStore;
use crate::uploads::UploadPipeline;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Postgres in production, in-memory when `DATABASE_URL` is unset.
    pub store: Arc<dyn ApplicationStore>,
    pub uploads: Arc<UploadPipeline>,
    pub config: Config,
}

impl AppState {
    pub fn new(store: Arc<dyn ApplicationStore>, config: Config) -> Self {
        Self {
            store,
            uploads: Arc::new(UploadPipeline::new(config.uploads_dir.clone())),
            config,
        }
    }
}
