//! Rendering layer: applies widget state changes to the host page.
//!
//! Each method looks up the element it needs and silently does nothing when
//! the host markup lacks it.

use std::sync::Arc;
use std::time::Duration;

use tracing::trace;

use super::message::ChatMessage;
use super::page::{INPUT_ID, MESSAGES_ID, MessageElement, Page, TYPING_INDICATOR_ID};
use super::scheduler::{self, TaskHandle};

#[derive(Clone)]
pub struct PageRenderer {
    page: Arc<dyn Page>,
    scroll_delay: Duration,
}

impl std::fmt::Debug for PageRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageRenderer")
            .field("scroll_delay", &self.scroll_delay)
            .finish_non_exhaustive()
    }
}

fn missing(id: &'static str) {
    trace!(name: "widget.element.missing", element = id, "Element not present, skipping");
}

impl PageRenderer {
    pub fn new(page: Arc<dyn Page>, scroll_delay: Duration) -> Self {
        Self { page, scroll_delay }
    }

    pub fn focus_input(&self) {
        match self.page.input() {
            Some(input) => input.focus(),
            None => missing(INPUT_ID),
        }
    }

    /// Current input text, `None` when there is no input field.
    pub fn read_input(&self) -> Option<String> {
        let value = self.page.input().map(|input| input.value());
        if value.is_none() {
            missing(INPUT_ID);
        }
        value
    }

    /// Returns `false` when there is no input field.
    pub fn write_input(&self, text: &str) -> bool {
        match self.page.input() {
            Some(input) => {
                input.set_value(text);
                true
            }
            None => {
                missing(INPUT_ID);
                false
            }
        }
    }

    /// Empty the input and restore its auto-sizing height.
    pub fn clear_input(&self) {
        if let Some(input) = self.page.input() {
            input.set_value("");
            input.reset_height();
        }
    }

    #[must_use]
    pub fn has_messages(&self) -> bool {
        self.page.messages().is_some()
    }

    /// Append a display element for `message` and schedule a scroll.
    /// Returns `false` when there is no messages container.
    ///
    /// The stamp is taken from the wall clock at this call.
    pub fn append(&self, message: &ChatMessage) -> bool {
        let Some(container) = self.page.messages() else {
            missing(MESSAGES_ID);
            return false;
        };

        let element = MessageElement {
            role: message.role(),
            text: message.text().to_string(),
            timestamp: message.formatted_time(),
        };
        container.append(&element);

        let _scroll = self.schedule_scroll();
        true
    }

    pub fn clear_messages(&self) {
        match self.page.messages() {
            Some(container) => container.clear_except_welcome(),
            None => missing(MESSAGES_ID),
        }
    }

    pub fn set_typing_visible(&self, visible: bool) {
        match self.page.typing_indicator() {
            Some(indicator) => indicator.set_visible(visible),
            None => missing(TYPING_INDICATOR_ID),
        }
    }

    /// Scroll the container to the bottom once layout settles.
    ///
    /// Not cancelled when superseded; scrolling is idempotent.
    pub fn schedule_scroll(&self) -> Option<TaskHandle> {
        let page = Arc::clone(&self.page);
        scheduler::schedule("scroll", self.scroll_delay, move || {
            if let Some(container) = page.messages() {
                container.scroll_to_bottom();
            }
        })
    }
}
