//! Application state.
//!
//! Shared state for all request handlers.

use std::sync::Arc;

use stc_cache::MemoryCache;
use stc_render::{EmbedAdapter, FsCatalog, RenderDispatcher, SettingsStore, StaticSettings};

use crate::ServerConfig;

/// Application state shared across all handlers.
pub(crate) struct AppState {
    /// Dispatcher producing render results.
    pub(crate) dispatcher: Arc<RenderDispatcher>,
    /// Adapter turning results into page markup.
    pub(crate) adapter: EmbedAdapter,
    /// Settings snapshot source.
    pub(crate) settings: Arc<dyn SettingsStore>,
    /// Item listing per namespace.
    pub(crate) catalog: FsCatalog,
    /// Application version for cache validation.
    pub(crate) version: String,
}

impl AppState {
    pub(crate) fn new(config: &ServerConfig) -> Self {
        let mut dispatcher = RenderDispatcher::new(config.root.clone(), &config.base_url)
            .with_override_filename(&config.override_filename);
        if config.cache_enabled {
            dispatcher = dispatcher.with_cache(&MemoryCache::new());
        }
        let catalog = FsCatalog::new(config.root.clone())
            .with_override_loader(dispatcher.override_loader().clone());

        let dispatcher = Arc::new(dispatcher);
        let settings: Arc<dyn SettingsStore> =
            Arc::new(StaticSettings::new(config.settings.clone()));

        Self {
            adapter: EmbedAdapter::new(Arc::clone(&dispatcher), Arc::clone(&settings)),
            dispatcher,
            settings,
            catalog,
            version: config.version.clone(),
        }
    }
}
