use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub webhook: WebhookConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 8080 }
    }
}

/// Default TTL per cache namespace, plus the sweep period.
#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    #[serde(default = "default_search_ttl")]
    pub search_ttl_secs: u64,
    #[serde(default = "default_entity_ttl")]
    pub entity_ttl_secs: u64,
    #[serde(default = "default_qualification_ttl")]
    pub qualification_ttl_secs: u64,
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

fn default_search_ttl() -> u64 { 300 }
fn default_entity_ttl() -> u64 { 600 }
fn default_qualification_ttl() -> u64 { 300 }
fn default_sweep_interval() -> u64 { 60 }

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            search_ttl_secs: default_search_ttl(),
            entity_ttl_secs: default_entity_ttl(),
            qualification_ttl_secs: default_qualification_ttl(),
            sweep_interval_secs: default_sweep_interval(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    #[serde(default = "default_namespace")]
    pub namespace: String,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_namespace() -> String { "records".to_string() }
fn default_debounce_ms() -> u64 { 300 }
fn default_limit() -> usize { 20 }

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            debounce_ms: default_debounce_ms(),
            limit: default_limit(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct WebhookConfig {
    #[serde(default)]
    pub search_url: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_timeout_ms() -> u64 { 10_000 }

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            search_url: String::new(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            // Per-environment overrides, optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Eg. `ENCART__CACHE__SEARCH_TTL_SECS=120`
            .add_source(config::Environment::with_prefix("ENCART").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.cache.entity_ttl_secs, 600);
        assert_eq!(config.cache.search_ttl_secs, 300);
        assert_eq!(config.cache.qualification_ttl_secs, 300);
        assert_eq!(config.search.debounce_ms, 300);
        assert_eq!(config.search.namespace, "records");
    }

    #[test]
    fn test_partial_source_falls_back_to_defaults() {
        let config: Config = config::Config::builder()
            .add_source(config::File::from_str(
                "[cache]\nsearch_ttl_secs = 120\n",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.cache.search_ttl_secs, 120);
        assert_eq!(config.cache.entity_ttl_secs, 600);
        assert_eq!(config.webhook.timeout_ms, 10_000);
    }
}
