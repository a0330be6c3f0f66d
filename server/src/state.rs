//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the database pool and the upload store; both are cheap to clone.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::ServerConfig;
use crate::services::upload::UploadStore;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub uploads: UploadStore,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    #[must_use]
    pub fn new(pool: PgPool, config: ServerConfig) -> Self {
        let uploads = UploadStore::new(config.upload_dir.clone(), config.max_upload_bytes);
        Self { pool, uploads, config: Arc::new(config) }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================


#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn new_wires_upload_store_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_helpers::test_app_state_with_uploads(dir.path());
        assert_eq!(state.uploads.dir(), dir.path());
        assert_eq!(state.uploads.max_bytes(), state.config.max_upload_bytes);
    }
}
