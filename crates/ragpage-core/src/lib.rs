pub mod api;
pub mod chat;
pub mod config;
pub mod connection;
pub mod markdown;
pub mod page;
pub mod state;

#[cfg(test)]
mod test_support;

// Re-export main types for convenience
pub use api::{RagClient, Source};
pub use chat::{ChatSession, PendingReply, Reply};
pub use config::Config;
pub use connection::ConnectionState;
pub use page::{Page, PageMetrics};
pub use state::{ChatMessage, ChatRole};
