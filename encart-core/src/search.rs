use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchOptions {
    pub limit: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self { limit: 20 }
    }
}

/// Envelope returned by the search backend.
///
/// Records stay loosely typed here; they are normalized into [`crate::Record`]
/// by the caller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResponse {
    pub success: bool,
    #[serde(default)]
    pub data: Vec<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SearchResponse {
    pub fn ok(data: Vec<serde_json::Value>) -> Self {
        Self { success: true, data, error: None }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self { success: false, data: Vec::new(), error: Some(error.into()) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_response_deserialization() {
        let json = r#"
            {
                "success": true,
                "data": [{ "id": "42", "nom": "Garage Martin" }]
            }
        "#;
        let response: SearchResponse = serde_json::from_str(json).expect("Failed to deserialize");
        assert!(response.success);
        assert_eq!(response.data.len(), 1);
        assert!(response.error.is_none());
    }

    #[test]
    fn test_failed_response_without_data() {
        let json = r#"{ "success": false, "error": "upstream timeout" }"#;
        let response: SearchResponse = serde_json::from_str(json).expect("Failed to deserialize");
        assert!(!response.success);
        assert!(response.data.is_empty());
        assert_eq!(response.error.as_deref(), Some("upstream timeout"));
    }
}
