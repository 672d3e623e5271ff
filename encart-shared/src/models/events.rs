use chrono::{DateTime, Utc};

/// Outcome of a debounced search, as seen by the presentation layer.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SearchOutcome {
    Completed { count: usize },
    /// Another lookup for the same key was already outstanding.
    Pending,
    Failed { error: String },
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
pub struct SearchEvent {
    pub query: String,
    pub outcome: SearchOutcome,
    pub fired_at: DateTime<Utc>,
}
