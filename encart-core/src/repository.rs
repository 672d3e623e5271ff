use async_trait::async_trait;
use crate::search::{SearchOptions, SearchResponse};

/// External record search backend.
///
/// Implementations own transport concerns (HTTP, retries); callers only see
/// the response envelope.
#[async_trait]
pub trait RecordSearchClient: Send + Sync {
    async fn search_records(
        &self,
        query: &str,
        options: SearchOptions,
    ) -> Result<SearchResponse, Box<dyn std::error::Error + Send + Sync>>;
}
