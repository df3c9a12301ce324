//! Chat session state machine
//!
//! A send moves through Idle -> Submitting -> Awaiting Response -> Idle.
//! `begin_submit` performs the synchronous Submitting step and hands back a
//! [`PendingReply`] that a front end can await on its own task. Feeding the
//! resulting [`Reply`] to `complete` returns the session to Idle.

use std::time::Duration;

use serde_json::Value;

use crate::api::{RagClient, Source};
use crate::connection::ConnectionState;
use crate::state::ChatMessage;

pub const ERROR_MESSAGE: &str = "Sorry, I encountered an error processing your question. Please make sure the API server is running.";

pub const DEMO_MESSAGE: &str = "⚠ Demo Mode: The RAG API is not connected. Please start the Flask server with 'python app.py' to enable live queries.\n\nThis system can answer WordPress development questions like:\n- How to use wp_enqueue_script?\n- What are WordPress hooks?\n- How to create custom post types?";

/// Simulated latency before the demo message appears
pub const DEMO_LATENCY: Duration = Duration::from_millis(500);

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// Informational response fields, logged without their JSON quoting
fn log_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => "unknown".to_string(),
    }
}

/// Outcome of the Awaiting Response step
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Answer {
        answer: String,
        sources: Option<Vec<Source>>,
    },
    Failed,
    Demo,
}

impl Reply {
    pub fn into_message(self) -> ChatMessage {
        match self {
            Reply::Answer { answer, sources } => ChatMessage::assistant(&answer, sources),
            Reply::Failed => ChatMessage::assistant(ERROR_MESSAGE, None),
            Reply::Demo => ChatMessage::assistant(DEMO_MESSAGE, None),
        }
    }
}

/// A submitted question waiting for its answer
#[derive(Clone)]
pub struct PendingReply {
    pub question: String,
    connection: ConnectionState,
    client: RagClient,
}

impl PendingReply {
    pub async fn resolve(self) -> Reply {
        if !self.connection.is_live() {
            tokio::time::sleep(DEMO_LATENCY).await;
            return Reply::Demo;
        }

        match self.client.query(&self.question).await {
            Ok(response) => {
                let Some(answer) = response.answer_text() else {
                    tracing::error!("RAG API returned no answer");
                    return Reply::Failed;
                };
                tracing::info!(
                    query_type = %log_text(response.query_type.as_ref()),
                    retrieval_time_ms = %log_text(response.retrieval_time_ms.as_ref()),
                    "Query answered"
                );
                Reply::Answer {
                    answer: answer.to_string(),
                    sources: response.sources,
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "RAG API Error");
                Reply::Failed
            }
        }
    }
}

pub struct ChatSession {
    messages: Vec<ChatMessage>,
    input: String,
    cursor: usize,
    input_enabled: bool,
    input_focused: bool,
    typing: bool,
    connection: ConnectionState,
    client: RagClient,
}

impl ChatSession {
    pub fn new(client: RagClient, connection: ConnectionState) -> Self {
        Self {
            messages: Vec::new(),
            input: String::new(),
            cursor: 0,
            input_enabled: true,
            input_focused: false,
            typing: false,
            connection,
            client,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// Cursor position in characters
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Input box and send control share this flag
    pub fn is_input_enabled(&self) -> bool {
        self.input_enabled
    }

    pub fn is_input_focused(&self) -> bool {
        self.input_focused
    }

    pub fn set_input_focused(&mut self, focused: bool) {
        self.input_focused = focused;
    }

    pub fn is_typing(&self) -> bool {
        self.typing
    }

    pub fn connection(&self) -> ConnectionState {
        self.connection
    }

    /// Record the startup probe result
    pub fn set_connection(&mut self, connection: ConnectionState) {
        self.connection = connection;
    }

    // Edits are ignored while a send is in flight.

    pub fn insert_char(&mut self, c: char) {
        if !self.input_enabled {
            return;
        }
        let byte_pos = char_to_byte_index(&self.input, self.cursor);
        self.input.insert(byte_pos, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if !self.input_enabled || self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let byte_pos = char_to_byte_index(&self.input, self.cursor);
        self.input.remove(byte_pos);
    }

    pub fn delete(&mut self) {
        if !self.input_enabled || self.cursor >= self.input.chars().count() {
            return;
        }
        let byte_pos = char_to_byte_index(&self.input, self.cursor);
        self.input.remove(byte_pos);
    }

    pub fn cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        let char_count = self.input.chars().count();
        self.cursor = (self.cursor + 1).min(char_count);
    }

    pub fn cursor_home(&mut self) {
        self.cursor = 0;
    }

    pub fn cursor_end(&mut self) {
        self.cursor = self.input.chars().count();
    }

    /// Submitting step. Returns `None` when there is nothing to send or a
    /// send is already in flight; the session is left untouched in that case.
    pub fn begin_submit(&mut self) -> Option<PendingReply> {
        if !self.input_enabled {
            return None;
        }

        let question = self.input.trim().to_string();
        if question.is_empty() {
            return None;
        }

        self.input_enabled = false;
        self.messages.push(ChatMessage::user(&question));
        self.input.clear();
        self.cursor = 0;
        self.typing = true;

        Some(PendingReply {
            question,
            connection: self.connection,
            client: self.client.clone(),
        })
    }

    /// Back to Idle with the reply appended
    pub fn complete(&mut self, reply: Reply) {
        self.remove_typing_indicator();
        self.messages.push(reply.into_message());
        self.input_enabled = true;
        self.input_focused = true;
    }

    /// Run a whole send cycle in place
    pub async fn submit(&mut self) -> bool {
        let Some(pending) = self.begin_submit() else {
            return false;
        };
        let reply = pending.resolve().await;
        self.complete(reply);
        true
    }

    fn remove_typing_indicator(&mut self) {
        self.typing = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::{format_source, to_html};
    use crate::test_support::spawn_server;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Instant;

    /// Server whose `/query` answers with `body` and counts hits
    async fn query_server(status: StatusCode, body: serde_json::Value) -> (String, Arc<AtomicUsize>) {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let app = Router::new().route(
            "/query",
            post(move || {
                let counter = counter.clone();
                let body = body.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    (status, Json(body))
                }
            }),
        );
        (spawn_server(app).await, hits)
    }

    fn type_text(session: &mut ChatSession, text: &str) {
        for c in text.chars() {
            session.insert_char(c);
        }
    }

    fn assert_idle(session: &ChatSession) {
        assert!(session.input().is_empty());
        assert!(session.is_input_enabled());
        assert!(session.is_input_focused());
        assert!(!session.is_typing());
    }

    #[tokio::test]
    async fn test_blank_input_is_a_no_op() {
        let (base, hits) = query_server(StatusCode::OK, json!({"answer": "x"})).await;
        let mut session = ChatSession::new(RagClient::new(&base), ConnectionState::Live);

        type_text(&mut session, "   \t ");
        assert!(!session.submit().await);

        assert!(session.messages().is_empty());
        assert!(session.is_input_enabled());
        assert!(!session.is_typing());
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_live_answer_with_sources() {
        let (base, hits) = query_server(
            StatusCode::OK,
            json!({
                "answer": "**Hi**",
                "sources": [{"title": "Doc", "type": "guide", "relevance_score": 0.87}],
                "query_type": "greeting",
                "retrieval_time_ms": 3.2
            }),
        )
        .await;
        let mut session = ChatSession::new(RagClient::new(&base), ConnectionState::Live);

        type_text(&mut session, "  hello  ");
        assert!(session.submit().await);

        assert_eq!(hits.load(Ordering::SeqCst), 1);
        let messages = session.messages();
        assert_eq!(messages.len(), 2);
        assert!(messages[0].is_user());
        assert_eq!(messages[0].content, "hello");

        let bot = &messages[1];
        assert!(!bot.is_user());
        assert_eq!(to_html(&bot.content), "<strong>Hi</strong>");
        let sources = bot.visible_sources().unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(format_source(&sources[0]), "Doc [guide] 87% relevant");

        assert_idle(&session);
    }

    #[tokio::test]
    async fn test_demo_mode_waits_and_never_calls_the_api() {
        let (base, hits) = query_server(StatusCode::OK, json!({"answer": "live"})).await;
        let mut session = ChatSession::new(RagClient::new(&base), ConnectionState::Demo);

        type_text(&mut session, "How to create custom post types?");
        let started = Instant::now();
        assert!(session.submit().await);

        assert!(started.elapsed() >= DEMO_LATENCY);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert_eq!(session.messages().len(), 2);
        assert_eq!(session.messages()[1].content, DEMO_MESSAGE);
        assert_idle(&session);
    }

    #[tokio::test]
    async fn test_server_error_shows_generic_message() {
        let (base, hits) = query_server(
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({"answer": "should be ignored"}),
        )
        .await;
        let mut session = ChatSession::new(RagClient::new(&base), ConnectionState::Live);

        type_text(&mut session, "What are WordPress hooks?");
        assert!(session.submit().await);

        assert_eq!(hits.load(Ordering::SeqCst), 1);
        let bots: Vec<_> = session.messages().iter().filter(|m| !m.is_user()).collect();
        assert_eq!(bots.len(), 1);
        assert_eq!(bots[0].content, ERROR_MESSAGE);
        assert!(bots[0].visible_sources().is_none());
        assert_idle(&session);
    }

    #[tokio::test]
    async fn test_missing_answer_shows_generic_message() {
        let (base, _hits) = query_server(StatusCode::OK, json!({"sources": []})).await;
        let mut session = ChatSession::new(RagClient::new(&base), ConnectionState::Live);

        type_text(&mut session, "anything");
        session.submit().await;

        assert_eq!(session.messages()[1].content, ERROR_MESSAGE);
        assert_idle(&session);
    }

    #[tokio::test]
    async fn test_oddly_typed_metadata_keeps_the_answer() {
        let (base, _hits) = query_server(
            StatusCode::OK,
            json!({
                "answer": "Real answer",
                "sources": [],
                "query_type": "how_to",
                "retrieval_time_ms": "12"
            }),
        )
        .await;
        let mut session = ChatSession::new(RagClient::new(&base), ConnectionState::Live);

        type_text(&mut session, "anything");
        session.submit().await;

        assert_eq!(session.messages()[1].content, "Real answer");
        assert!(session.messages()[1].visible_sources().is_none());
    }

    #[tokio::test]
    async fn test_null_source_fields_keep_the_answer() {
        let (base, _hits) = query_server(
            StatusCode::OK,
            json!({
                "answer": "Real answer",
                "sources": [{"title": "Doc", "type": "guide", "relevance_score": null}]
            }),
        )
        .await;
        let mut session = ChatSession::new(RagClient::new(&base), ConnectionState::Live);

        type_text(&mut session, "anything");
        session.submit().await;

        let bot = &session.messages()[1];
        assert_eq!(bot.content, "Real answer");
        let sources = bot.visible_sources().unwrap();
        assert_eq!(format_source(&sources[0]), "Doc [guide] 0% relevant");
    }

    #[tokio::test]
    async fn test_health_check_timeout_does_not_limit_queries() {
        let app = Router::new().route(
            "/query",
            post(|| async {
                tokio::time::sleep(std::time::Duration::from_millis(1500)).await;
                Json(json!({"answer": "slow but fine"}))
            }),
        );
        let base = spawn_server(app).await;

        let mut config = crate::Config::new();
        config.api_url = Some(base);
        config.probe_timeout_secs = Some(1);

        // The health-check client gives up, the chat client waits
        assert!(config.probe_client().unwrap().query("q").await.is_err());

        let mut session = ChatSession::new(config.chat_client(), ConnectionState::Live);
        type_text(&mut session, "anything");
        session.submit().await;
        assert_eq!(session.messages()[1].content, "slow but fine");
    }

    #[tokio::test]
    async fn test_network_error_shows_generic_message() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = RagClient::new(&format!("http://{}", addr));
        let mut session = ChatSession::new(client, ConnectionState::Live);

        type_text(&mut session, "anything");
        session.submit().await;

        assert_eq!(session.messages().len(), 2);
        assert_eq!(session.messages()[1].content, ERROR_MESSAGE);
        assert_idle(&session);
    }

    #[test]
    fn test_submitting_disables_controls_until_complete() {
        let mut session = ChatSession::new(RagClient::new("http://127.0.0.1:1"), ConnectionState::Demo);
        type_text(&mut session, "first");

        let pending = session.begin_submit().unwrap();
        assert_eq!(pending.question, "first");
        assert!(!session.is_input_enabled());
        assert!(session.is_typing());
        assert!(session.input().is_empty());
        assert_eq!(session.messages().len(), 1);

        // Controls are disabled: typing and a second send do nothing.
        type_text(&mut session, "second");
        assert!(session.input().is_empty());
        assert!(session.begin_submit().is_none());
        assert_eq!(session.messages().len(), 1);

        session.complete(Reply::Demo);
        assert_idle(&session);
        assert_eq!(session.messages().len(), 2);
    }

    #[test]
    fn test_connection_is_read_at_submit_time() {
        let mut session = ChatSession::new(RagClient::new("http://127.0.0.1:1"), ConnectionState::Demo);
        session.set_connection(ConnectionState::Live);
        assert_eq!(session.connection(), ConnectionState::Live);

        type_text(&mut session, "q");
        let pending = session.begin_submit().unwrap();
        assert!(pending.connection.is_live());
    }

    #[test]
    fn test_input_editing_is_utf8_safe() {
        let mut session = ChatSession::new(RagClient::new("http://127.0.0.1:1"), ConnectionState::Demo);
        type_text(&mut session, "héllo");
        session.cursor_left();
        session.cursor_left();
        session.backspace();
        assert_eq!(session.input(), "hélo");
        session.cursor_home();
        session.delete();
        assert_eq!(session.input(), "élo");
        session.cursor_end();
        session.insert_char('!');
        assert_eq!(session.input(), "élo!");
        assert_eq!(session.cursor(), 4);
    }
}
