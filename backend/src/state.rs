//! Application state management
//!
//! The shared state passed to every request handler via Axum's state
//! extraction. Built once at startup; every field is cheap to clone.

use crate::config::AppConfig;
use crate::services::ProductCatalog;
use crate::storage::Store;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Repository object for all entity types
    pub store: Store,
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Simulated external food database
    pub catalog: ProductCatalog,
}

impl AppState {
    pub fn new(store: Store, config: AppConfig) -> Self {
        let catalog = ProductCatalog::new(config.catalog.clone());
        Self {
            store,
            config: Arc::new(config),
            catalog,
        }
    }

    #[inline]
    pub fn store(&self) -> &Store {
        &self.store
    }

    #[inline]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    #[inline]
    pub fn catalog(&self) -> &ProductCatalog {
        &self.catalog
    }
}
