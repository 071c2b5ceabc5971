//! Chat message model.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who authored a message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Typed (or quick-replied) by the person using the widget.
    User,
    /// Produced by the simulated assistant.
    Bot,
    /// Widget notices, e.g. an over-long input.
    System,
}

impl Role {
    /// CSS class suffix used by the host markup (`user-message`, ...).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Bot => "bot",
            Self::System => "system",
        }
    }
}

/// A single entry in the conversation history.
///
/// Messages are immutable once created; fields are only exposed through
/// accessors.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    id: Uuid,
    role: Role,
    text: String,
    sent_at: DateTime<Local>,
}

impl ChatMessage {
    /// Create a message stamped with the current wall-clock time.
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self::with_time(role, text, Local::now())
    }

    /// Create a message with an explicit timestamp.
    pub fn with_time(role: Role, text: impl Into<String>, sent_at: DateTime<Local>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            text: text.into(),
            sent_at,
        }
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn sent_at(&self) -> DateTime<Local> {
        self.sent_at
    }

    #[must_use]
    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }

    #[must_use]
    pub fn is_bot(&self) -> bool {
        self.role == Role::Bot
    }

    #[must_use]
    pub fn is_system(&self) -> bool {
        self.role == Role::System
    }

    /// Local time of day as `HH:MM` (24-hour, zero-padded).
    #[must_use]
    pub fn formatted_time(&self) -> String {
        format_time_of_day(&self.sent_at)
    }
}

/// Format a timestamp as a 24-hour, zero-padded `HH:MM` stamp.
#[must_use]
pub fn format_time_of_day(at: &DateTime<Local>) -> String {
    at.format("%H:%M").to_string()
}
