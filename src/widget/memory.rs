//! In-memory page for embedding and tests.

use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use super::page::{MessageContainer, MessageElement, Page, TextInput, TypingIndicator};
use super::rules::WELCOME_TEXT;

/// Text entry backed by a string.
#[derive(Debug, Default)]
pub struct MemoryInput {
    value: RwLock<String>,
    focused: AtomicBool,
    height_resets: AtomicUsize,
}

impl TextInput for MemoryInput {
    fn value(&self) -> String {
        self.value.read().unwrap().clone()
    }

    fn set_value(&self, value: &str) {
        *self.value.write().unwrap() = value.to_string();
    }

    fn focus(&self) {
        self.focused.store(true, Ordering::SeqCst);
    }

    fn reset_height(&self) {
        self.height_resets.fetch_add(1, Ordering::SeqCst);
    }
}

/// A child of the messages container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// The static welcome block (`.welcome-message`).
    Welcome(String),
    Message(MessageElement),
}

/// Messages container with a line-based scroll model: scroll height is the
/// number of children.
#[derive(Debug, Default)]
pub struct MemoryMessages {
    children: RwLock<Vec<Node>>,
    scroll_top: AtomicUsize,
    scroll_calls: AtomicUsize,
}

impl MemoryMessages {
    fn with_welcome(text: &str) -> Self {
        Self {
            children: RwLock::new(vec![Node::Welcome(text.to_string())]),
            ..Self::default()
        }
    }
}

impl MessageContainer for MemoryMessages {
    fn append(&self, element: &MessageElement) {
        self.children
            .write()
            .unwrap()
            .push(Node::Message(element.clone()));
    }

    fn clear_except_welcome(&self) {
        self.children
            .write()
            .unwrap()
            .retain(|node| matches!(node, Node::Welcome(_)));
    }

    fn scroll_to_bottom(&self) {
        let height = self.children.read().unwrap().len();
        self.scroll_top.store(height, Ordering::SeqCst);
        self.scroll_calls.fetch_add(1, Ordering::SeqCst);
    }
}

/// Indicator backed by a flag.
#[derive(Debug, Default)]
pub struct MemoryIndicator {
    visible: AtomicBool,
}

impl TypingIndicator for MemoryIndicator {
    fn set_visible(&self, visible: bool) {
        self.visible.store(visible, Ordering::SeqCst);
    }
}

/// Page whose elements live in memory.
///
/// All elements are present by default; the `without_*` builders remove
/// them to model incomplete host markup.
#[derive(Debug)]
pub struct MemoryPage {
    input: Option<MemoryInput>,
    messages: Option<MemoryMessages>,
    indicator: Option<MemoryIndicator>,
}

impl Default for MemoryPage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryPage {
    #[must_use]
    pub fn new() -> Self {
        Self {
            input: Some(MemoryInput::default()),
            messages: Some(MemoryMessages::with_welcome(WELCOME_TEXT)),
            indicator: Some(MemoryIndicator::default()),
        }
    }

    #[must_use]
    pub fn without_input(mut self) -> Self {
        self.input = None;
        self
    }

    #[must_use]
    pub fn without_messages(mut self) -> Self {
        self.messages = None;
        self
    }

    #[must_use]
    pub fn without_typing_indicator(mut self) -> Self {
        self.indicator = None;
        self
    }

    /// Simulate typing into the input field.
    pub fn type_text(&self, text: &str) {
        if let Some(input) = &self.input {
            input.set_value(text);
        }
    }

    #[must_use]
    pub fn input_value(&self) -> Option<String> {
        self.input.as_ref().map(TextInput::value)
    }

    #[must_use]
    pub fn input_focused(&self) -> bool {
        self.input
            .as_ref()
            .is_some_and(|i| i.focused.load(Ordering::SeqCst))
    }

    #[must_use]
    pub fn input_height_resets(&self) -> usize {
        self.input
            .as_ref()
            .map_or(0, |i| i.height_resets.load(Ordering::SeqCst))
    }

    /// All container children, welcome block included.
    #[must_use]
    pub fn nodes(&self) -> Vec<Node> {
        self.messages
            .as_ref()
            .map(|m| m.children.read().unwrap().clone())
            .unwrap_or_default()
    }

    /// Rendered messages only.
    #[must_use]
    pub fn rendered(&self) -> Vec<MessageElement> {
        self.nodes()
            .into_iter()
            .filter_map(|node| match node {
                Node::Message(element) => Some(element),
                Node::Welcome(_) => None,
            })
            .collect()
    }

    #[must_use]
    pub fn has_welcome(&self) -> bool {
        self.nodes().iter().any(|n| matches!(n, Node::Welcome(_)))
    }

    #[must_use]
    pub fn typing_visible(&self) -> bool {
        self.indicator
            .as_ref()
            .is_some_and(|i| i.visible.load(Ordering::SeqCst))
    }

    #[must_use]
    pub fn scroll_top(&self) -> usize {
        self.messages
            .as_ref()
            .map_or(0, |m| m.scroll_top.load(Ordering::SeqCst))
    }

    #[must_use]
    pub fn scroll_height(&self) -> usize {
        self.nodes().len()
    }

    #[must_use]
    pub fn scroll_calls(&self) -> usize {
        self.messages
            .as_ref()
            .map_or(0, |m| m.scroll_calls.load(Ordering::SeqCst))
    }
}

impl Page for MemoryPage {
    fn input(&self) -> Option<&dyn TextInput> {
        self.input.as_ref().map(|i| i as &dyn TextInput)
    }

    fn messages(&self) -> Option<&dyn MessageContainer> {
        self.messages.as_ref().map(|m| m as &dyn MessageContainer)
    }

    fn typing_indicator(&self) -> Option<&dyn TypingIndicator> {
        self.indicator.as_ref().map(|i| i as &dyn TypingIndicator)
    }
}
