//! Host page contract.
//!
//! The widget never owns markup. The host supplies three elements by fixed
//! id, any of which may be missing; a missing element turns the step that
//! needs it into a no-op.

use super::message::Role;

/// Id of the multi-line text entry.
pub const INPUT_ID: &str = "messageInput";
/// Id of the scrolling messages container.
pub const MESSAGES_ID: &str = "chatMessages";
/// Id of the typing indicator.
pub const TYPING_INDICATOR_ID: &str = "typingIndicator";
/// Class of the always-present welcome block inside the container.
pub const WELCOME_CLASS: &str = "welcome-message";

/// Multi-line text entry.
pub trait TextInput: Send + Sync {
    fn value(&self) -> String;
    fn set_value(&self, value: &str);
    fn focus(&self);
    /// Restore the auto-sizing height after content was cleared.
    fn reset_height(&self);
}

/// Container the rendered messages are appended to.
pub trait MessageContainer: Send + Sync {
    fn append(&self, element: &MessageElement);
    /// Remove every child except the welcome block.
    fn clear_except_welcome(&self);
    fn scroll_to_bottom(&self);
}

/// "Bot is typing" indicator.
pub trait TypingIndicator: Send + Sync {
    fn set_visible(&self, visible: bool);
}

/// Element lookups on the host page.
pub trait Page: Send + Sync {
    fn input(&self) -> Option<&dyn TextInput>;
    fn messages(&self) -> Option<&dyn MessageContainer>;
    fn typing_indicator(&self) -> Option<&dyn TypingIndicator>;
}

/// Display element built for one rendered message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageElement {
    pub role: Role,
    pub text: String,
    /// `HH:MM` local time of the render call.
    pub timestamp: String,
}

impl MessageElement {
    /// Class list of the outer element, e.g. `message bot-message`.
    #[must_use]
    pub fn class_name(&self) -> String {
        format!("message {}-message", self.role.as_str())
    }
}

/// Keyboard key the widget reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Other,
}

/// Keydown event delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub shift: bool,
}

impl KeyEvent {
    #[must_use]
    pub fn enter() -> Self {
        Self {
            key: Key::Enter,
            shift: false,
        }
    }

    #[must_use]
    pub fn shift_enter() -> Self {
        Self {
            key: Key::Enter,
            shift: true,
        }
    }
}

/// What the host should do with the native keypress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// The widget handled it; suppress the default line break.
    PreventDefault,
    /// Leave native behavior alone.
    Default,
}
