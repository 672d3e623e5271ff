pub mod record;
pub mod repository;
pub mod search;

pub use record::{AlternateSource, Record};
pub use repository::RecordSearchClient;
pub use search::{SearchOptions, SearchResponse};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error("Internal service error: {0}")]
    InternalError(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
