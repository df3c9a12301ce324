//! Wire types for the RAG API
//!
//! The server is an external collaborator; these mirror the JSON it speaks.
//! Unknown fields are ignored and missing optional fields default, so a
//! partially-shaped body still parses and is judged by its content.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Number of documents requested per query. Fixed by the client.
pub const QUERY_TOP_K: u32 = 3;

/// Body of `GET /health`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub rag_initialized: bool,
}

impl HealthResponse {
    /// Both conditions are required: the server is up and its retriever is loaded.
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy" && self.rag_initialized
    }
}

/// Body of `POST /query`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub question: String,
    pub k: u32,
}

impl QueryRequest {
    pub fn new(question: &str) -> Self {
        Self {
            question: question.to_string(),
            k: QUERY_TOP_K,
        }
    }
}

/// Missing and `null` both become the type's default
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A document cited in support of an answer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Source {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub source_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub relevance_score: f64,
}

/// Response of `POST /query`
///
/// Only `answer` and `sources` affect rendering. The other two are logged
/// as they arrived, whatever their JSON type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub sources: Option<Vec<Source>>,
    #[serde(default)]
    pub query_type: Option<Value>,
    #[serde(default)]
    pub retrieval_time_ms: Option<Value>,
}

impl QueryResponse {
    /// The answer text, if the server produced a non-empty one
    pub fn answer_text(&self) -> Option<&str> {
        self.answer.as_deref().filter(|a| !a.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_requires_both_conditions() {
        let cases = [
            (r#"{"status":"healthy","rag_initialized":true}"#, true),
            (r#"{"status":"healthy","rag_initialized":false}"#, false),
            (r#"{"status":"degraded","rag_initialized":true}"#, false),
            (r#"{"status":"healthy"}"#, false),
            (r#"{}"#, false),
        ];
        for (body, expected) in cases {
            let health: HealthResponse = serde_json::from_str(body).unwrap();
            assert_eq!(health.is_healthy(), expected, "body: {}", body);
        }
    }

    #[test]
    fn test_query_request_always_asks_for_three() {
        let body = serde_json::to_value(QueryRequest::new("What are hooks?")).unwrap();
        assert_eq!(body, serde_json::json!({"question": "What are hooks?", "k": 3}));
    }

    #[test]
    fn test_query_response_parses_full_body() {
        let body = r#"{
            "answer": "Use **add_action**.",
            "sources": [{"title": "Plugin Handbook", "type": "guide", "relevance_score": 0.91}],
            "query_type": "how_to",
            "retrieval_time_ms": 42.5
        }"#;
        let response: QueryResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.answer_text(), Some("Use **add_action**."));
        let sources = response.sources.unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].source_type, "guide");
        assert_eq!(response.query_type, Some(serde_json::json!("how_to")));
        assert_eq!(response.retrieval_time_ms, Some(serde_json::json!(42.5)));
    }

    #[test]
    fn test_informational_fields_accept_any_shape() {
        let body = r#"{"answer": "ok", "query_type": 7, "retrieval_time_ms": "12"}"#;
        let response: QueryResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.answer_text(), Some("ok"));
        assert_eq!(response.retrieval_time_ms, Some(serde_json::json!("12")));
    }

    #[test]
    fn test_null_source_fields_default() {
        let body = r#"{"title": null, "type": "guide", "relevance_score": null}"#;
        let source: Source = serde_json::from_str(body).unwrap();
        assert_eq!(source.title, "");
        assert_eq!(source.source_type, "guide");
        assert_eq!(source.relevance_score, 0.0);
    }

    #[test]
    fn test_empty_answer_counts_as_missing() {
        let response: QueryResponse = serde_json::from_str(r#"{"answer": ""}"#).unwrap();
        assert_eq!(response.answer_text(), None);

        let response: QueryResponse = serde_json::from_str(r#"{"sources": []}"#).unwrap();
        assert_eq!(response.answer_text(), None);
    }
}
