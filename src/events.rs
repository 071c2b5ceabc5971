//! Widget event stream.
//!
//! Every state change the widget makes is published as a [`WidgetEvent`] on
//! a broadcast channel. Observers (the terminal host's `--emit-events`
//! mode, tests) subscribe with [`crate::ChatWidget::subscribe`].
//!
//! # Example
//!
//! ```rust
//! use chat_widget::events::{WidgetEvent, event_line};
//!
//! let line = event_line(&WidgetEvent::TypingShown);
//! assert!(line.contains("typing.shown"));
//! ```

use serde::{Deserialize, Serialize};

use crate::widget::message::ChatMessage;

/// Why a submission produced no message pair.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// No input field on the page.
    MissingInput,
    /// Whitespace-only text.
    Empty,
    /// Over the configured character limit.
    TooLong,
}

/// Events emitted by a widget instance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data")]
pub enum WidgetEvent {
    // ─────────────────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────────────────
    /// The widget mirrored the welcome message into history.
    #[serde(rename = "widget.initialized")]
    Initialized {
        /// Widget instance identifier.
        widget_id: String,
    },

    /// History was cleared by a reset.
    #[serde(rename = "conversation.cleared")]
    ConversationCleared {
        /// Pending replies cancelled by the reset (0 unless enabled).
        cancelled_replies: usize,
    },

    // ─────────────────────────────────────────────────────────────────────
    // Messages
    // ─────────────────────────────────────────────────────────────────────
    /// A message was appended to history and handed to the renderer.
    #[serde(rename = "message.rendered")]
    MessageRendered(ChatMessage),

    /// A submission was ignored.
    #[serde(rename = "input.rejected")]
    InputRejected {
        reason: RejectReason,
    },

    // ─────────────────────────────────────────────────────────────────────
    // Simulated replies
    // ─────────────────────────────────────────────────────────────────────
    /// The typing indicator was shown.
    #[serde(rename = "typing.shown")]
    TypingShown,

    /// The typing indicator was hidden.
    #[serde(rename = "typing.hidden")]
    TypingHidden,

    /// A bot reply was scheduled.
    #[serde(rename = "reply.scheduled")]
    ReplyScheduled {
        /// Delay before the reply renders, in milliseconds.
        delay_ms: u64,
    },
}

impl WidgetEvent {
    /// Dotted event name, matching the serialized `type` tag.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Initialized { .. } => "widget.initialized",
            Self::ConversationCleared { .. } => "conversation.cleared",
            Self::MessageRendered(_) => "message.rendered",
            Self::InputRejected { .. } => "input.rejected",
            Self::TypingShown => "typing.shown",
            Self::TypingHidden => "typing.hidden",
            Self::ReplyScheduled { .. } => "reply.scheduled",
        }
    }
}

/// Serialize an event as one JSON line.
pub fn event_line(evt: &WidgetEvent) -> String {
    serde_json::to_string(evt).unwrap_or_else(|e| {
        serde_json::json!({ "type": "error", "data": { "message": e.to_string() } }).to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::message::Role;

    #[test]
    fn test_tag_matches_name() {
        let events = [
            WidgetEvent::Initialized {
                widget_id: "w".to_string(),
            },
            WidgetEvent::ConversationCleared {
                cancelled_replies: 0,
            },
            WidgetEvent::MessageRendered(ChatMessage::new(Role::Bot, "hi")),
            WidgetEvent::InputRejected {
                reason: RejectReason::Empty,
            },
            WidgetEvent::TypingShown,
            WidgetEvent::TypingHidden,
            WidgetEvent::ReplyScheduled { delay_ms: 750 },
        ];

        for event in &events {
            let value: serde_json::Value = serde_json::from_str(&event_line(event)).unwrap();
            assert_eq!(value["type"], event.name());
        }
    }

    #[test]
    fn test_reject_reason_snake_case() {
        let line = event_line(&WidgetEvent::InputRejected {
            reason: RejectReason::TooLong,
        });
        assert!(line.contains("\"too_long\""));
    }
}
