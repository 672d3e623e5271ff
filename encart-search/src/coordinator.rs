use dashmap::DashSet;
use encart_core::{Record, RecordSearchClient, SearchOptions};
use encart_store::caches::{normalize_query, search_key};
use encart_store::CacheRegistry;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SearchError {
    #[error("Invalid query: {0}")]
    Validation(String),

    #[error("Search backend failed: {0}")]
    Collaborator(String),
}

/// Marks a cache key as being fetched; the mark is cleared on drop, whether
/// the fetch succeeded, failed, or its future was dropped.
struct InFlightGuard<'a> {
    keys: &'a DashSet<String>,
    key: String,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(keys: &'a DashSet<String>, key: &str) -> Option<Self> {
        keys.insert(key.to_string()).then(|| Self {
            keys,
            key: key.to_string(),
        })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.keys.remove(&self.key);
    }
}

/// Cache-aware record search with at most one outstanding backend call per key.
pub struct SearchCoordinator {
    client: Arc<dyn RecordSearchClient>,
    caches: CacheRegistry,
    in_flight: DashSet<String>,
    namespace: String,
    options: SearchOptions,
}

impl SearchCoordinator {
    pub fn new(
        client: Arc<dyn RecordSearchClient>,
        caches: CacheRegistry,
        namespace: impl Into<String>,
        options: SearchOptions,
    ) -> Self {
        Self {
            client,
            caches,
            in_flight: DashSet::new(),
            namespace: namespace.into(),
            options,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    /// Search records for `query`.
    ///
    /// - `Ok(Some(records))`: cache hit, or a fresh backend result (now cached).
    /// - `Ok(None)`: the same key is already being fetched by another caller.
    ///   That caller fills the cache; this one is not queued.
    /// - `Err(_)`: empty query, or the backend failed. Failures are not cached
    ///   and not retried here.
    pub async fn search(&self, query: &str) -> Result<Option<Vec<Record>>, SearchError> {
        let normalized = normalize_query(query);
        if normalized.is_empty() {
            return Err(SearchError::Validation("query is empty".to_string()));
        }

        let key = search_key(&self.namespace, &normalized);
        if let Some(records) = self.caches.search.get(&key) {
            debug!("Cache hit for {}", key);
            return Ok(Some(records));
        }

        let Some(_guard) = InFlightGuard::acquire(&self.in_flight, &key) else {
            info!("Lookup for {} already in flight, skipping duplicate", key);
            return Ok(None);
        };

        let response = self
            .client
            .search_records(&normalized, self.options)
            .await
            .map_err(|e| {
                warn!("Search for '{}' failed: {}", normalized, e);
                SearchError::Collaborator(e.to_string())
            })?;

        if !response.success {
            let reason = response.error.unwrap_or_else(|| "unknown error".to_string());
            warn!("Search backend rejected '{}': {}", normalized, reason);
            return Err(SearchError::Collaborator(reason));
        }

        let records: Vec<Record> = response
            .data
            .iter()
            .filter_map(|raw| match Record::from_value(raw) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!("Dropping malformed record from search results: {}", e);
                    None
                }
            })
            .collect();

        for record in &records {
            self.caches.remember_entity(record);
        }
        self.caches.search.set(key, records.clone(), None);

        info!("Search '{}' returned {} records", normalized, records.len());
        Ok(Some(records))
    }
}
