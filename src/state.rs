// src/state.rs

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::{
    config::Config,
    services::{AttemptLedger, Catalog, ResponseRecorder, ReviewAggregator},
    store::{AttemptStore, CatalogStore, ResponseStore, SqliteStore},
    utils::snapshot_cache::SnapshotCache,
};

#[derive(Clone)]
pub struct AppState {
    pub catalog: Catalog,
    pub ledger: AttemptLedger,
    pub recorder: ResponseRecorder,
    pub review: ReviewAggregator,
    pub snapshots: Arc<SnapshotCache>,
}

impl AppState {
    /// Wires every component to the SQLite backend.
    pub fn new(pool: SqlitePool, config: &Config) -> Self {
        let store = Arc::new(SqliteStore::new(pool));
        Self::with_stores(store.clone(), store.clone(), store, config)
    }

    pub fn with_stores(
        catalog_store: Arc<dyn CatalogStore>,
        attempt_store: Arc<dyn AttemptStore>,
        response_store: Arc<dyn ResponseStore>,
        config: &Config,
    ) -> Self {
        let catalog = Catalog::new(catalog_store);
        let ledger = AttemptLedger::new(attempt_store.clone());
        let recorder = ResponseRecorder::new(response_store);
        let review = ReviewAggregator::new(catalog.clone(), attempt_store, recorder.clone());

        Self {
            catalog,
            ledger,
            recorder,
            review,
            snapshots: Arc::new(SnapshotCache::new(config.snapshot_ttl)),
        }
    }
}
