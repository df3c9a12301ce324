//! UI-agnostic chat transcript types
//!
//! Shared by every front end; nothing here depends on a UI framework.

use serde::{Deserialize, Serialize};

use crate::api::Source;

/// A chat message in the transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    /// Citations backing an answer. `None` and an empty list render the same.
    pub sources: Option<Vec<Source>>,
}

/// The role of a chat message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatMessage {
    pub fn user(content: &str) -> Self {
        Self {
            role: ChatRole::User,
            content: content.to_string(),
            sources: None,
        }
    }

    pub fn assistant(content: &str, sources: Option<Vec<Source>>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.to_string(),
            sources,
        }
    }

    pub fn is_user(&self) -> bool {
        self.role == ChatRole::User
    }

    /// Sources worth showing, if any
    pub fn visible_sources(&self) -> Option<&[Source]> {
        self.sources.as_deref().filter(|s| !s.is_empty())
    }
}
