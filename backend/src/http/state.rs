//! Application state for the HTTP server.

use std::sync::Arc;

use crate::services::{ReportBuilder, ReportJobRegistry, ReportSource};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Synchronous report builder over the loaded tables
    pub builder: Arc<ReportBuilder>,
    /// Asynchronous report jobs
    pub jobs: ReportJobRegistry,
}

impl AppState {
    /// Create state whose jobs run on `builder` with the given concurrency bound.
    pub fn new(builder: Arc<ReportBuilder>, max_concurrent_jobs: usize) -> Self {
        let source: Arc<dyn ReportSource> = builder.clone();
        Self {
            jobs: ReportJobRegistry::new(source, max_concurrent_jobs),
            builder,
        }
    }

    /// Create state with a pre-built job registry.
    pub fn with_registry(builder: Arc<ReportBuilder>, jobs: ReportJobRegistry) -> Self {
        Self { builder, jobs }
    }
}
