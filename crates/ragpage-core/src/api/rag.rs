use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use reqwest::Client;

use super::types::{HealthResponse, QueryRequest, QueryResponse};

#[derive(Clone)]
pub struct RagClient {
    client: Client,
    base_url: String,
}

impl RagClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Client whose requests give up after `timeout`. `None` keeps the
    /// transport default.
    pub fn with_timeout(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn health(&self) -> Result<HealthResponse> {
        let url = format!("{}/health", self.base_url);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(anyhow!("Health check failed with status: {}", response.status()));
        }

        let health: HealthResponse = response
            .json()
            .await
            .context("health check returned a malformed body")?;
        Ok(health)
    }

    pub async fn query(&self, question: &str) -> Result<QueryResponse> {
        let url = format!("{}/query", self.base_url);

        let request = QueryRequest::new(question);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!("API error: {}", response.status()));
        }

        let query_response: QueryResponse = response
            .json()
            .await
            .context("query returned a malformed body")?;
        Ok(query_response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::spawn_server;
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let client = RagClient::new("http://127.0.0.1:5000/");
        assert_eq!(client.base_url(), "http://127.0.0.1:5000");
    }

    #[tokio::test]
    async fn test_health_parses_body() {
        let app = Router::new().route(
            "/health",
            get(|| async { Json(json!({"status": "healthy", "rag_initialized": true})) }),
        );
        let base = spawn_server(app).await;

        let health = RagClient::new(&base).health().await.unwrap();
        assert!(health.is_healthy());
    }

    #[tokio::test]
    async fn test_health_rejects_server_error() {
        let app = Router::new().route(
            "/health",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "starting") }),
        );
        let base = spawn_server(app).await;

        assert!(RagClient::new(&base).health().await.is_err());
    }

    #[tokio::test]
    async fn test_health_rejects_non_json() {
        let app = Router::new().route("/health", get(|| async { "ok" }));
        let base = spawn_server(app).await;

        assert!(RagClient::new(&base).health().await.is_err());
    }

    #[tokio::test]
    async fn test_query_posts_question_with_k() {
        let seen: Arc<Mutex<Option<Value>>> = Arc::new(Mutex::new(None));
        let recorder = seen.clone();
        let app = Router::new().route(
            "/query",
            post(move |Json(body): Json<Value>| {
                let recorder = recorder.clone();
                async move {
                    *recorder.lock().unwrap() = Some(body);
                    Json(json!({
                        "answer": "Hooks let plugins run code at defined points.",
                        "sources": [],
                        "query_type": "conceptual",
                        "retrieval_time_ms": 12
                    }))
                }
            }),
        );
        let base = spawn_server(app).await;

        let response = RagClient::new(&base).query("What are WordPress hooks?").await.unwrap();
        assert_eq!(
            response.answer_text(),
            Some("Hooks let plugins run code at defined points.")
        );
        assert_eq!(response.retrieval_time_ms, Some(serde_json::json!(12)));

        let body = seen.lock().unwrap().clone().unwrap();
        assert_eq!(body, json!({"question": "What are WordPress hooks?", "k": 3}));
    }

    #[tokio::test]
    async fn test_query_rejects_server_error() {
        let app = Router::new().route(
            "/query",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let base = spawn_server(app).await;

        let err = RagClient::new(&base).query("anything").await.unwrap_err();
        assert!(err.to_string().contains("500"));
    }
}
