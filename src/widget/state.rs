//! Pure conversation state and input validation.
//!
//! Nothing here touches the page or the clock beyond message timestamps,
//! so the transitions can be exercised without a renderer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::message::ChatMessage;

/// Conversation history plus the typing flag.
#[derive(Debug, Clone, Default)]
pub struct ChatState {
    history: Vec<ChatMessage>,
    is_typing: bool,
}

impl ChatState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message. History is append-only between resets.
    pub fn push(&mut self, message: ChatMessage) {
        self.history.push(message);
    }

    #[must_use]
    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    #[must_use]
    pub fn last(&self) -> Option<&ChatMessage> {
        self.history.last()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.history.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    #[must_use]
    pub fn is_typing(&self) -> bool {
        self.is_typing
    }

    /// Set the typing flag, returning whether it changed.
    pub fn set_typing(&mut self, typing: bool) -> bool {
        let changed = self.is_typing != typing;
        self.is_typing = typing;
        changed
    }

    /// Drop all history and force the typing flag off.
    pub fn clear(&mut self) {
        self.history.clear();
        self.is_typing = false;
    }
}

/// Outcome of validating raw input text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Nothing but whitespace; ignored.
    Empty,
    /// Longer than the configured limit (in characters).
    TooLong { limit: usize },
    /// Trimmed text to send.
    Accepted(String),
}

/// Trim and validate input.
///
/// Without a limit the only rejection is empty text.
#[must_use]
pub fn validate_input(raw: &str, max_chars: Option<usize>) -> Submission {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Submission::Empty;
    }

    match max_chars {
        Some(limit) if trimmed.chars().count() > limit => Submission::TooLong { limit },
        _ => Submission::Accepted(trimmed.to_string()),
    }
}

/// Notice rendered when input exceeds the length limit.
#[must_use]
pub fn too_long_notice(limit: usize) -> String {
    format!("Message too long. Maximum length is {limit} characters.")
}

/// Serializable snapshot of a widget's conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    pub widget_id: Uuid,
    pub exported_at: DateTime<Utc>,
    pub is_typing: bool,
    pub messages: Vec<ChatMessage>,
}

impl Transcript {
    #[must_use]
    pub fn capture(widget_id: Uuid, state: &ChatState) -> Self {
        Self {
            widget_id,
            exported_at: Utc::now(),
            is_typing: state.is_typing(),
            messages: state.history().to_vec(),
        }
    }

    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
