//! Chat widget controller.
//!
//! Owns one conversation, drives the page through [`PageRenderer`], and
//! schedules simulated replies. Cloning a [`ChatWidget`] yields another
//! handle to the same instance; separate `ChatWidget::new` calls are fully
//! independent.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use tokio::sync::broadcast;
use tracing::{debug, info};
use uuid::Uuid;

use super::message::{ChatMessage, Role};
use super::page::{Key, KeyEvent, KeyOutcome, Page};
use super::render::PageRenderer;
use super::rules::{self, RESET_RULE, WELCOME_TEXT};
use super::scheduler::{self, DelayRange, PendingTasks};
use super::state::{self, ChatState, Submission, Transcript};
use crate::events::{RejectReason, WidgetEvent};

/// Capacity of the per-widget event channel.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Validated timing and behavior settings for a widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetSettings {
    /// Range the simulated reply latency is drawn from.
    pub reply_delay: DelayRange,
    /// Delay before scrolling to the newest message.
    pub scroll_delay: Duration,
    /// Delay before the confirmation after a reset.
    pub reset_delay: Duration,
    /// Abort replies still pending when the conversation is reset.
    pub cancel_pending_on_reset: bool,
    /// Optional character limit on submitted text.
    pub max_input_chars: Option<usize>,
    /// Text mirrored into history by [`ChatWidget::init`].
    pub welcome_text: String,
}

impl Default for WidgetSettings {
    fn default() -> Self {
        Self {
            reply_delay: DelayRange::new(Duration::from_millis(600), Duration::from_millis(1200))
                .unwrap_or_else(|| DelayRange::fixed(Duration::from_millis(600))),
            scroll_delay: Duration::from_millis(100),
            reset_delay: Duration::from_millis(300),
            cancel_pending_on_reset: false,
            max_input_chars: None,
            welcome_text: WELCOME_TEXT.to_string(),
        }
    }
}

/// Handle to a chat widget instance.
///
/// Delayed steps (replies, scrolling, reset confirmation) run on the ambient
/// tokio runtime. Without one, entry points still update the page and
/// history but those steps are skipped.
#[derive(Debug, Clone)]
pub struct ChatWidget {
    inner: Arc<WidgetInner>,
}

#[derive(Debug)]
struct WidgetInner {
    id: Uuid,
    settings: WidgetSettings,
    state: RwLock<ChatState>,
    renderer: PageRenderer,
    pending_replies: PendingTasks,
    events: broadcast::Sender<WidgetEvent>,
}

impl ChatWidget {
    /// Create a widget bound to `page`.
    pub fn new(page: Arc<dyn Page>, settings: WidgetSettings) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let renderer = PageRenderer::new(page, settings.scroll_delay);

        Self {
            inner: Arc::new(WidgetInner {
                id: Uuid::new_v4(),
                settings,
                state: RwLock::new(ChatState::new()),
                renderer,
                pending_replies: PendingTasks::new(),
                events,
            }),
        }
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    #[must_use]
    pub fn settings(&self) -> &WidgetSettings {
        &self.inner.settings
    }

    /// Subscribe to this widget's events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<WidgetEvent> {
        self.inner.events.subscribe()
    }

    /// Snapshot of the conversation history.
    #[must_use]
    pub fn history(&self) -> Vec<ChatMessage> {
        self.inner.state.read().unwrap().history().to_vec()
    }

    #[must_use]
    pub fn history_len(&self) -> usize {
        self.inner.state.read().unwrap().len()
    }

    #[must_use]
    pub fn is_typing(&self) -> bool {
        self.inner.state.read().unwrap().is_typing()
    }

    /// Number of simulated replies that have not been delivered yet.
    #[must_use]
    pub fn pending_replies(&self) -> usize {
        self.inner.pending_replies.len()
    }

    #[must_use]
    pub fn transcript(&self) -> Transcript {
        Transcript::capture(self.inner.id, &self.inner.state.read().unwrap())
    }

    fn emit(&self, event: WidgetEvent) {
        // No subscribers is fine.
        let _ = self.inner.events.send(event);
    }

    /// Page-ready hook: focus the input and mirror the welcome message.
    ///
    /// The host markup already shows the welcome block, so it is only
    /// recorded, not rendered.
    pub fn init(&self) {
        self.inner.renderer.focus_input();

        let welcome = ChatMessage::new(Role::Bot, self.inner.settings.welcome_text.as_str());
        self.inner.state.write().unwrap().push(welcome);

        info!(name: "widget.initialized", widget_id = %self.inner.id, "Chat initialized");
        self.emit(WidgetEvent::Initialized {
            widget_id: self.inner.id.to_string(),
        });
    }

    /// Send whatever is in the input field.
    ///
    /// Whitespace-only input is ignored. Accepted text is rendered at once
    /// and answered by exactly one bot message after a random delay.
    /// Overlapping sends are neither queued nor de-duplicated.
    pub fn submit(&self) {
        let renderer = &self.inner.renderer;

        let Some(raw) = renderer.read_input() else {
            self.emit(WidgetEvent::InputRejected {
                reason: RejectReason::MissingInput,
            });
            return;
        };

        let text = match state::validate_input(&raw, self.inner.settings.max_input_chars) {
            Submission::Accepted(text) => text,
            Submission::Empty => {
                self.emit(WidgetEvent::InputRejected {
                    reason: RejectReason::Empty,
                });
                return;
            }
            Submission::TooLong { limit } => {
                debug!(name: "widget.input.too_long", widget_id = %self.inner.id, limit, "Input over limit");
                renderer.clear_input();
                self.render_message(Role::System, &state::too_long_notice(limit));
                self.emit(WidgetEvent::InputRejected {
                    reason: RejectReason::TooLong,
                });
                return;
            }
        };

        self.render_message(Role::User, &text);
        renderer.clear_input();
        self.show_typing();

        let delay = self.inner.settings.reply_delay.sample();
        let delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        let chars = text.chars().count();

        let widget = self.clone();
        let Some(handle) = scheduler::schedule("reply", delay, move || widget.deliver_reply(&text))
        else {
            // No runtime to deliver on; nothing is outstanding.
            self.hide_typing();
            return;
        };
        self.inner.pending_replies.track(handle);

        debug!(
            name: "widget.reply.scheduled",
            widget_id = %self.inner.id,
            delay_ms,
            chars,
            "Reply scheduled"
        );
        self.emit(WidgetEvent::ReplyScheduled { delay_ms });
    }

    fn deliver_reply(&self, user_text: &str) {
        self.hide_typing();

        let rule = rules::select_response(user_text);
        debug!(
            name: "widget.reply.delivered",
            widget_id = %self.inner.id,
            rule = ?rule.key,
            title = rule.title,
            "Reply delivered"
        );
        self.render_message(Role::Bot, rule.body);
    }

    /// Keydown binding for the input field.
    ///
    /// Enter sends; Shift+Enter keeps the native line break.
    pub fn handle_keyboard_submit(&self, event: &KeyEvent) -> KeyOutcome {
        if event.key == Key::Enter && !event.shift {
            self.submit();
            KeyOutcome::PreventDefault
        } else {
            KeyOutcome::Default
        }
    }

    /// Put `text` into the input field and send it.
    pub fn send_suggested_reply(&self, text: &str) {
        if self.inner.renderer.write_input(text) {
            self.submit();
        }
    }

    /// Clear the conversation and post the reset confirmation.
    ///
    /// The welcome block stays on the page. Replies already scheduled still
    /// arrive unless `cancel_pending_on_reset` is set.
    pub fn reset_conversation(&self) {
        let renderer = &self.inner.renderer;
        if !renderer.has_messages() {
            return;
        }

        {
            let mut state = self.inner.state.write().unwrap();
            renderer.clear_messages();
            state.clear();
        }

        let cancelled_replies = if self.inner.settings.cancel_pending_on_reset {
            self.inner.pending_replies.cancel_all()
        } else {
            0
        };

        self.hide_typing();

        info!(
            name: "widget.conversation.reset",
            widget_id = %self.inner.id,
            cancelled_replies,
            "Conversation reset"
        );
        self.emit(WidgetEvent::ConversationCleared { cancelled_replies });

        let widget = self.clone();
        // Not tracked as a reply; a later reset never cancels it.
        let _confirmation = scheduler::schedule("reset", self.inner.settings.reset_delay, move || {
            widget.render_message(Role::Bot, RESET_RULE.body);
        });
    }

    /// Render a message and append it to history.
    ///
    /// Returns `None` without touching history when the page has no
    /// messages container.
    pub fn render_message(&self, role: Role, text: &str) -> Option<ChatMessage> {
        let message = ChatMessage::new(role, text);
        {
            // Page and history change under one lock so their orders agree.
            let mut state = self.inner.state.write().unwrap();
            if !self.inner.renderer.append(&message) {
                return None;
            }
            state.push(message.clone());
        }
        self.emit(WidgetEvent::MessageRendered(message.clone()));
        Some(message)
    }

    fn show_typing(&self) {
        self.inner.state.write().unwrap().set_typing(true);
        self.inner.renderer.set_typing_visible(true);
        let _scroll = self.inner.renderer.schedule_scroll();
        self.emit(WidgetEvent::TypingShown);
    }

    fn hide_typing(&self) {
        self.inner.state.write().unwrap().set_typing(false);
        self.inner.renderer.set_typing_visible(false);
        self.emit(WidgetEvent::TypingHidden);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::memory::MemoryPage;
    use crate::widget::rules::{DEFAULT_RULE, FEATURES_RULE, HELP_RULE};

    fn widget() -> (Arc<MemoryPage>, ChatWidget) {
        let page = Arc::new(MemoryPage::new());
        let widget = ChatWidget::new(Arc::clone(&page) as Arc<dyn Page>, WidgetSettings::default());
        (page, widget)
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(1300)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_init_records_welcome_without_rendering() {
        let (page, widget) = widget();
        widget.init();

        assert!(page.input_focused());
        assert_eq!(widget.history_len(), 1);
        assert_eq!(widget.history()[0].text(), WELCOME_TEXT);
        assert!(widget.history()[0].is_bot());
        assert!(page.rendered().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_submit_is_noop() {
        let (page, widget) = widget();
        let mut events = widget.subscribe();

        page.type_text("   \n ");
        widget.submit();

        assert_eq!(widget.history_len(), 0);
        assert!(page.rendered().is_empty());
        assert!(!widget.is_typing());
        assert_eq!(widget.pending_replies(), 0);
        assert_eq!(
            events.try_recv().unwrap(),
            WidgetEvent::InputRejected {
                reason: RejectReason::Empty
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_flow() {
        let (page, widget) = widget();
        page.type_text("  Can you show me the features?  ");
        widget.submit();

        // User message is immediate, reply is not.
        let history = widget.history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].text(), "Can you show me the features?");
        assert_eq!(page.input_value().as_deref(), Some(""));
        assert_eq!(page.input_height_resets(), 1);
        assert!(widget.is_typing());
        assert!(page.typing_visible());
        assert_eq!(widget.pending_replies(), 1);

        tokio::time::sleep(Duration::from_millis(599)).await;
        assert_eq!(widget.history_len(), 1);

        tokio::time::sleep(Duration::from_millis(602)).await;
        let history = widget.history();
        assert_eq!(history.len(), 2);
        assert!(history[1].is_bot());
        assert_eq!(history[1].text(), FEATURES_RULE.body);
        assert!(!widget.is_typing());
        assert!(!page.typing_visible());
        assert_eq!(page.rendered().len(), 2);
        assert_eq!(widget.pending_replies(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_keyboard_binding() {
        let (page, widget) = widget();

        page.type_text("I need help");
        assert_eq!(
            widget.handle_keyboard_submit(&KeyEvent::shift_enter()),
            KeyOutcome::Default
        );
        assert_eq!(widget.history_len(), 0);

        let other = KeyEvent {
            key: Key::Other,
            shift: false,
        };
        assert_eq!(widget.handle_keyboard_submit(&other), KeyOutcome::Default);
        assert_eq!(widget.history_len(), 0);

        assert_eq!(
            widget.handle_keyboard_submit(&KeyEvent::enter()),
            KeyOutcome::PreventDefault
        );
        assert_eq!(widget.history_len(), 1);

        settle().await;
        assert_eq!(widget.history()[1].text(), HELP_RULE.body);
    }

    #[tokio::test(start_paused = true)]
    async fn test_suggested_reply() {
        let (page, widget) = widget();
        widget.send_suggested_reply("hello there");

        assert_eq!(widget.history()[0].text(), "hello there");
        assert_eq!(page.input_value().as_deref(), Some(""));

        settle().await;
        assert_eq!(widget.history()[1].text(), DEFAULT_RULE.body);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_clears_then_confirms() {
        let (page, widget) = widget();
        widget.init();
        widget.send_suggested_reply("hi");
        settle().await;
        assert_eq!(widget.history_len(), 3);

        widget.reset_conversation();
        assert_eq!(widget.history_len(), 0);
        assert!(!widget.is_typing());
        assert!(page.rendered().is_empty());
        assert!(page.has_welcome());

        tokio::time::sleep(Duration::from_millis(299)).await;
        assert_eq!(widget.history_len(), 0);

        tokio::time::sleep(Duration::from_millis(2)).await;
        let history = widget.history();
        assert_eq!(history.len(), 1);
        assert!(history[0].is_bot());
        assert_eq!(history[0].text(), RESET_RULE.body);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_keeps_pending_reply_by_default() {
        let (page, widget) = widget();
        widget.send_suggested_reply("help");
        assert!(page.typing_visible());

        widget.reset_conversation();
        assert!(!widget.is_typing());
        assert!(!page.typing_visible());

        settle().await;
        let texts: Vec<String> = widget.history().iter().map(|m| m.text().to_string()).collect();
        assert_eq!(texts.len(), 2);
        assert!(texts.contains(&RESET_RULE.body.to_string()));
        assert!(texts.contains(&HELP_RULE.body.to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_can_cancel_pending_reply() {
        let page = Arc::new(MemoryPage::new());
        let settings = WidgetSettings {
            cancel_pending_on_reset: true,
            ..WidgetSettings::default()
        };
        let widget = ChatWidget::new(Arc::clone(&page) as Arc<dyn Page>, settings);
        let mut events = widget.subscribe();

        widget.send_suggested_reply("help");
        assert!(widget.is_typing());

        widget.reset_conversation();
        assert!(!widget.is_typing());
        assert!(!page.typing_visible());

        settle().await;
        let history = widget.history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].text(), RESET_RULE.body);
        assert_eq!(widget.pending_replies(), 0);

        let mut cleared = None;
        while let Ok(event) = events.try_recv() {
            if let WidgetEvent::ConversationCleared { cancelled_replies } = event {
                cleared = Some(cancelled_replies);
            }
        }
        assert_eq!(cleared, Some(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_too_long_input_posts_notice() {
        let page = Arc::new(MemoryPage::new());
        let settings = WidgetSettings {
            max_input_chars: Some(5),
            ..WidgetSettings::default()
        };
        let widget = ChatWidget::new(Arc::clone(&page) as Arc<dyn Page>, settings);

        page.type_text("way too long");
        widget.submit();

        let history = widget.history();
        assert_eq!(history.len(), 1);
        assert!(history[0].is_system());
        assert!(history[0].text().contains("Maximum length is 5"));
        assert_eq!(page.input_value().as_deref(), Some(""));
        assert!(!widget.is_typing());
        assert_eq!(widget.pending_replies(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_elements_are_tolerated() {
        let page = Arc::new(
            MemoryPage::new()
                .without_input()
                .without_messages()
                .without_typing_indicator(),
        );
        let widget = ChatWidget::new(Arc::clone(&page) as Arc<dyn Page>, WidgetSettings::default());

        widget.init();
        widget.submit();
        widget.send_suggested_reply("help");
        widget.reset_conversation();
        assert!(widget.render_message(Role::Bot, "x").is_none());

        settle().await;
        // Only the welcome mirror from init.
        assert_eq!(widget.history_len(), 1);
    }

    #[test]
    fn test_entry_points_without_runtime() {
        let (page, widget) = widget();
        widget.init();

        page.type_text("help");
        widget.submit();
        assert_eq!(widget.history_len(), 2);
        assert!(!widget.is_typing());
        assert!(!page.typing_visible());
        assert_eq!(widget.pending_replies(), 0);

        assert!(widget.render_message(Role::Bot, "direct").is_some());
        widget.reset_conversation();
        assert_eq!(widget.history_len(), 0);
        assert!(page.rendered().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_instances_are_independent() {
        let (_a_page, a) = widget();
        let (_b_page, b) = widget();

        a.send_suggested_reply("help");
        settle().await;

        assert_eq!(a.history_len(), 2);
        assert_eq!(b.history_len(), 0);
        assert_ne!(a.id(), b.id());
    }
}
