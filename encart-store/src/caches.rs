use encart_core::Record;
use encart_shared::Clock;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::app_config::CacheConfig;
use crate::ttl_cache::{CacheStats, Sweepable, TtlCache};

/// Lowercased, trimmed, single-spaced form of a user query.
pub fn normalize_query(query: &str) -> String {
    query
        .split_whitespace()
        .map(|part| part.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn search_key(namespace: &str, query: &str) -> String {
    format!("{}_{}", namespace, normalize_query(query))
}

pub fn entity_key(id: &str) -> String {
    format!("enterprise_{}", id)
}

pub fn qualification_key(entity_id: &str, action_type: &str) -> String {
    format!("qualification_{}_{}", entity_id, action_type)
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct RegistryStats {
    pub search: CacheStats,
    pub entity: CacheStats,
    pub qualification: CacheStats,
}

/// One cache per key namespace, each with its own default TTL.
///
/// Built once at startup and handed to whoever needs it.
#[derive(Clone)]
pub struct CacheRegistry {
    pub search: Arc<TtlCache<Vec<Record>>>,
    pub entity: Arc<TtlCache<Record>>,
    pub qualification: Arc<TtlCache<serde_json::Value>>,
}

impl CacheRegistry {
    pub fn new(config: &CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            search: Arc::new(TtlCache::new(
                "search",
                Duration::from_secs(config.search_ttl_secs),
                clock.clone(),
            )),
            entity: Arc::new(TtlCache::new(
                "entity",
                Duration::from_secs(config.entity_ttl_secs),
                clock.clone(),
            )),
            qualification: Arc::new(TtlCache::new(
                "qualification",
                Duration::from_secs(config.qualification_ttl_secs),
                clock,
            )),
        }
    }

    pub fn remember_entity(&self, record: &Record) {
        self.entity.set(entity_key(&record.id), record.clone(), None);
    }

    pub fn entity(&self, id: &str) -> Option<Record> {
        self.entity.get(&entity_key(id))
    }

    pub fn remember_qualification(&self, entity_id: &str, action_type: &str, value: serde_json::Value) {
        self.qualification
            .set(qualification_key(entity_id, action_type), value, None);
    }

    pub fn qualification(&self, entity_id: &str, action_type: &str) -> Option<serde_json::Value> {
        self.qualification.get(&qualification_key(entity_id, action_type))
    }

    pub fn sweepables(&self) -> Vec<Arc<dyn Sweepable>> {
        vec![
            self.search.clone() as Arc<dyn Sweepable>,
            self.entity.clone() as Arc<dyn Sweepable>,
            self.qualification.clone() as Arc<dyn Sweepable>,
        ]
    }

    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            search: self.search.stats(),
            entity: self.entity.stats(),
            qualification: self.qualification.stats(),
        }
    }
}
