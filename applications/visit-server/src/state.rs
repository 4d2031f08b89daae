/// Shared application state
use crate::config::{ServerConfig, StoreBackend};
use crate::error::Result;
use crate::store::{MemoryVisitStore, UpstashVisitStore, VisitStore};
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn VisitStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn VisitStore>) -> Self {
        Self { store }
    }

    /// Build the configured store
    pub fn from_config(config: &ServerConfig) -> Result<Self> {
        let store: Arc<dyn VisitStore> = match config.store.backend {
            StoreBackend::Memory => Arc::new(MemoryVisitStore::new()),
            StoreBackend::Upstash => Arc::new(UpstashVisitStore::from_settings(&config.store)?),
        };
        Ok(Self::new(store))
    }
}
