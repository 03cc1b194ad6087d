// Application state module
// Shared, read-only state handed to every request

use std::sync::Arc;

use super::types::Config;
use crate::catalog::Catalog;

/// Application state
///
/// Built once before the listener starts accepting; never mutated after.
pub struct AppState {
    pub config: Config,
    pub catalog: Arc<Catalog>,
}

impl AppState {
    pub fn new(config: Config, catalog: Catalog) -> Self {
        Self {
            config,
            catalog: Arc::new(catalog),
        }
    }

    pub const fn access_log(&self) -> bool {
        self.config.logging.access_log
    }
}
