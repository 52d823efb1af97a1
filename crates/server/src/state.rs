//! Application State
//!
//! Shared state across all handlers. The knowledge index sits behind a lock
//! only so it can be swapped wholesale on reload; handlers take a cheap
//! `Arc` snapshot and never hold the lock while matching.

use metrics_exporter_prometheus::PrometheusHandle;
use parking_lot::RwLock;
use std::sync::Arc;

use compliance_assist_config::Settings;
use compliance_assist_core::Retriever;
use compliance_assist_rag::{MatrixRetriever, RagError};

use crate::metrics::record_knowledge_rows;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<RwLock<Settings>>,
    retriever: Arc<RwLock<Arc<MatrixRetriever>>>,
    metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create state around an already-built retriever
    pub fn new(config: Settings, retriever: MatrixRetriever) -> Self {
        record_knowledge_rows(retriever.row_count());
        Self {
            config: Arc::new(RwLock::new(config)),
            retriever: Arc::new(RwLock::new(Arc::new(retriever))),
            metrics: None,
        }
    }

    /// Load the knowledge base named in `config` and create state around it
    pub fn from_settings(config: Settings) -> Result<Self, RagError> {
        let retriever = MatrixRetriever::from_settings(&config)?;
        Ok(Self::new(config, retriever))
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// Snapshot of the live retriever
    pub fn retriever(&self) -> Arc<MatrixRetriever> {
        Arc::clone(&self.retriever.read())
    }

    /// Get a read guard to the current configuration
    pub fn get_config(&self) -> parking_lot::RwLockReadGuard<'_, Settings> {
        self.config.read()
    }

    pub fn metrics_handle(&self) -> Option<&PrometheusHandle> {
        self.metrics.as_ref()
    }

    /// Rebuild the index from disk and swap it in
    ///
    /// On failure the previous index stays live. Returns the new row count.
    pub fn reload_knowledge(&self) -> Result<usize, RagError> {
        let config = self.get_config().clone();
        let fresh = MatrixRetriever::from_settings(&config)?;
        let rows = fresh.row_count();

        *self.retriever.write() = Arc::new(fresh);
        record_knowledge_rows(rows);

        tracing::info!(
            path = %config.knowledge.path,
            rows,
            "Knowledge base reloaded"
        );
        Ok(rows)
    }
}
