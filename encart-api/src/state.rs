use encart_catalog::PricingCatalog;
use encart_core::{RecordSearchClient, SearchOptions};
use encart_offer::{ClientProfiler, OfferGenerator, OfferHistory};
use encart_search::{SearchCoordinator, SearchDebouncer};
use encart_shared::Clock;
use encart_store::app_config::Config;
use encart_store::CacheRegistry;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

#[derive(Clone)]
pub struct AppState {
    pub caches: CacheRegistry,
    pub coordinator: Arc<SearchCoordinator>,
    pub debouncer: Arc<SearchDebouncer>,
    pub profiler: Arc<ClientProfiler>,
    pub generator: Arc<OfferGenerator>,
    pub history: Arc<RwLock<OfferHistory>>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// Wire every component from config around the given search backend.
    pub fn new(config: &Config, client: Arc<dyn RecordSearchClient>, clock: Arc<dyn Clock>) -> Self {
        let caches = CacheRegistry::new(&config.cache, clock.clone());
        let coordinator = SearchCoordinator::new(
            client,
            caches.clone(),
            config.search.namespace.clone(),
            SearchOptions { limit: config.search.limit },
        );

        let coordinator = Arc::new(coordinator);
        let debouncer = SearchDebouncer::new(
            coordinator.clone(),
            Duration::from_millis(config.search.debounce_ms),
            clock.clone(),
        );

        Self {
            caches,
            coordinator,
            debouncer: Arc::new(debouncer),
            profiler: Arc::new(ClientProfiler::new(clock.clone())),
            generator: Arc::new(OfferGenerator::new(PricingCatalog::default(), clock.clone())),
            history: Arc::new(RwLock::new(OfferHistory::new())),
            clock,
        }
    }
}
