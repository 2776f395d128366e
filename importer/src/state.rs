//! Application state for the importer.

use std::sync::Arc;

use common::config::AppConfig;
use common::errors::AppResult;
use common::models::ImportReport;

use crate::service::ImportService;
use crate::store::DocumentStore;

/// Configuration plus the open store connection.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub store: Arc<dyn DocumentStore>,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(config: AppConfig, store: Arc<dyn DocumentStore>) -> Self {
        Self { config, store }
    }

    pub fn import_service(&self) -> ImportService {
        ImportService::new(self.store.clone(), self.config.import.clone())
    }

    /// Runs the import and closes the store whatever the outcome.
    pub async fn run(&self, run_id: &str) -> AppResult<ImportReport> {
        let result = self.import_service().run(run_id).await;
        self.store.close().await;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::errors::AppError;

    use crate::store::memory::MemoryStore;

    fn config(data_dir: &std::path::Path) -> AppConfig {
        AppConfig::from_lookup("importer-test", |_| None)
            .unwrap()
            .with_data_dir(data_dir)
    }

    #[tokio::test]
    async fn test_store_closed_after_successful_run() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(config(dir.path()), store.clone());

        let report = state.run("run-ok").await.unwrap();

        // none of the default sources exist in an empty directory
        assert_eq!(report.mappings.len(), 5);
        assert!(report
            .mappings
            .iter()
            .all(|m| matches!(m.import, common::models::ImportStatus::Skipped(_))));
        assert!(store.is_closed());
    }

    #[tokio::test]
    async fn test_store_closed_after_failed_run() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(MemoryStore::new().fail_listing());
        let state = AppState::new(config(dir.path()), store.clone());

        let err = state.run("run-err").await.unwrap_err();

        assert!(matches!(err, AppError::Unexpected(_)));
        assert!(store.is_closed());
    }
}
