//! Application state shared across handlers.

use std::sync::Arc;

use caprichos_core::StoreConfig;

use crate::config::StorefrontConfig;
use crate::pages::{PageLayout, PageStore};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// configuration and the live page store.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    store: StoreConfig,
    layout: PageLayout,
    pages: PageStore,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: StorefrontConfig) -> Self {
        let store = config.store_config();
        let layout = PageLayout::standard(config.reset_button);
        let pages = PageStore::new(config.max_pages, config.page_ttl);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                layout,
                pages,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Widget configuration every new page is mounted with.
    #[must_use]
    pub fn store_config(&self) -> &StoreConfig {
        &self.inner.store
    }

    /// Elements the store page renders.
    #[must_use]
    pub fn layout(&self) -> &PageLayout {
        &self.inner.layout
    }

    /// Get a reference to the live page store.
    #[must_use]
    pub fn pages(&self) -> &PageStore {
        &self.inner.pages
    }
}
