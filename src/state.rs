//! Application state shared by every handler: the lesson store, the block
//! registry and the loaded configuration.

use std::sync::Arc;

use tracing::{info, instrument};

use crate::config::AppConfig;
use crate::engine::{BlockRegistry, LessonRunner};
use crate::store::{FileLessonStore, LessonStore};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn LessonStore>,
    pub registry: Arc<BlockRegistry>,
    pub config: AppConfig,
}

impl AppState {
    /// File-backed store under the configured directory, all built-in block types.
    #[instrument(level = "info", skip_all)]
    pub fn new(config: AppConfig) -> Self {
        let store = FileLessonStore::new(config.store.dir.clone());
        info!(target: "lesson_engine", dir = %store.dir().display(), "Using file lesson store");
        Self::with_store(Arc::new(store), config)
    }

    pub fn with_store(store: Arc<dyn LessonStore>, config: AppConfig) -> Self {
        let registry = Arc::new(BlockRegistry::standard());
        info!(target: "lesson_engine", block_types = registry.tags().len(), "Block registry ready");
        Self { store, registry, config }
    }

    /// A fresh runner for one play session.
    pub fn new_runner(&self) -> LessonRunner {
        LessonRunner::new(self.registry.clone(), self.config.engine.settings())
    }
}
