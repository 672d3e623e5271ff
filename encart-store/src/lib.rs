pub mod app_config;
pub mod caches;
pub mod sweeper;
pub mod ttl_cache;
pub mod webhook;

pub use caches::CacheRegistry;
pub use sweeper::CacheSweeper;
pub use ttl_cache::{CacheStats, Sweepable, TtlCache};
pub use webhook::WebhookSearchClient;
