use std::sync::Arc;
use travelpair_core::{Config, ProviderStore, SearchService};

/// Shared application state
pub struct AppState {
    config: Config,
    provider_store: Arc<dyn ProviderStore>,
    service: Arc<SearchService>,
}

impl AppState {
    pub fn new(
        config: Config,
        provider_store: Arc<dyn ProviderStore>,
        service: Arc<SearchService>,
    ) -> Self {
        Self {
            config,
            provider_store,
            service,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn provider_store(&self) -> &dyn ProviderStore {
        self.provider_store.as_ref()
    }

    pub fn service(&self) -> &SearchService {
        self.service.as_ref()
    }
}
