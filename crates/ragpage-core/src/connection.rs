//! Startup connectivity probe
//!
//! The probe runs once when the page comes up. Its result is handed to the
//! chat session and to the status indicator; nothing re-checks it later.

use crate::api::RagClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    Live,
    /// Also the state before the probe has answered.
    #[default]
    Demo,
}

impl ConnectionState {
    pub fn is_live(&self) -> bool {
        matches!(self, ConnectionState::Live)
    }

    /// Text of the status indicator
    pub fn label(&self) -> &'static str {
        match self {
            ConnectionState::Live => "Live RAG System",
            ConnectionState::Demo => "Demo Mode",
        }
    }

    /// Style class of the status indicator
    pub fn style_class(&self) -> &'static str {
        match self {
            ConnectionState::Live => "status-live",
            ConnectionState::Demo => "status-demo",
        }
    }
}

impl From<bool> for ConnectionState {
    fn from(healthy: bool) -> Self {
        if healthy {
            ConnectionState::Live
        } else {
            ConnectionState::Demo
        }
    }
}

/// Check `/health` once. Any failure degrades to demo mode.
pub async fn probe(client: &RagClient) -> ConnectionState {
    match client.health().await {
        Ok(health) if health.is_healthy() => {
            tracing::info!(base_url = client.base_url(), "Connected to RAG API");
            ConnectionState::Live
        }
        Ok(health) => {
            tracing::warn!(
                status = %health.status,
                rag_initialized = health.rag_initialized,
                "API running but RAG not initialized"
            );
            ConnectionState::Demo
        }
        Err(e) => {
            tracing::warn!(error = %e, "API not available - using demo mode");
            ConnectionState::Demo
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::spawn_server;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;

    async fn probe_with(body: serde_json::Value) -> ConnectionState {
        let app = Router::new().route("/health", get(move || async move { Json(body) }));
        let base = spawn_server(app).await;
        probe(&RagClient::new(&base)).await
    }

    #[tokio::test]
    async fn test_healthy_and_initialized_is_live() {
        let state = probe_with(json!({"status": "healthy", "rag_initialized": true})).await;
        assert_eq!(state, ConnectionState::Live);
        assert_eq!(state.label(), "Live RAG System");
        assert_eq!(state.style_class(), "status-live");
    }

    #[tokio::test]
    async fn test_any_other_combination_is_demo() {
        for body in [
            json!({"status": "healthy", "rag_initialized": false}),
            json!({"status": "loading", "rag_initialized": true}),
            json!({"status": "healthy"}),
            json!({"unexpected": 1}),
        ] {
            let state = probe_with(body.clone()).await;
            assert_eq!(state, ConnectionState::Demo, "body: {}", body);
            assert_eq!(state.label(), "Demo Mode");
            assert_eq!(state.style_class(), "status-demo");
        }
    }

    #[tokio::test]
    async fn test_error_status_is_demo() {
        let app = Router::new().route(
            "/health",
            get(|| async {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"status": "healthy", "rag_initialized": true})),
                )
            }),
        );
        let base = spawn_server(app).await;
        assert_eq!(probe(&RagClient::new(&base)).await, ConnectionState::Demo);
    }

    #[tokio::test]
    async fn test_unreachable_server_is_demo() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = RagClient::new(&format!("http://{}", addr));
        assert_eq!(probe(&client).await, ConnectionState::Demo);
    }

    #[test]
    fn test_default_is_demo() {
        assert_eq!(ConnectionState::default(), ConnectionState::Demo);
        assert!(!ConnectionState::default().is_live());
    }
}
