//! Terminal page: the widget's elements rendered as lines of text.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use tracing::warn;

use crate::widget::message::Role;
use crate::widget::page::{MessageContainer, MessageElement, Page, TextInput, TypingIndicator};

type Output = Arc<Mutex<Box<dyn Write + Send>>>;

fn write_line(out: &Output, line: &str) {
    let mut guard = out.lock().unwrap();
    if let Err(e) = writeln!(guard, "{line}") {
        warn!(name: "host.output.failed", error = %e, "Failed to write to terminal");
    }
}

fn label(role: Role) -> &'static str {
    match role {
        Role::User => "you",
        Role::Bot => "bot",
        Role::System => "notice",
    }
}

/// Input buffer filled from stdin lines.
#[derive(Debug, Default)]
pub struct TerminalInput {
    value: RwLock<String>,
}

impl TextInput for TerminalInput {
    fn value(&self) -> String {
        self.value.read().unwrap().clone()
    }

    fn set_value(&self, value: &str) {
        *self.value.write().unwrap() = value.to_string();
    }

    // The cursor is always on the prompt line.
    fn focus(&self) {}

    fn reset_height(&self) {}
}

struct TerminalMessages {
    out: Output,
    welcome: String,
}

impl MessageContainer for TerminalMessages {
    fn append(&self, element: &MessageElement) {
        let mut lines = element.text.lines();
        let first = lines.next().unwrap_or_default();
        write_line(
            &self.out,
            &format!("[{}] {}: {first}", element.timestamp, label(element.role)),
        );
        for line in lines {
            write_line(&self.out, &format!("        {line}"));
        }
    }

    fn clear_except_welcome(&self) {
        write_line(&self.out, "──────── conversation cleared ────────");
        write_line(&self.out, &self.welcome);
    }

    fn scroll_to_bottom(&self) {
        if let Err(e) = self.out.lock().unwrap().flush() {
            warn!(name: "host.output.failed", error = %e, "Failed to flush terminal");
        }
    }
}

struct TerminalIndicator {
    out: Output,
    visible: AtomicBool,
}

impl TypingIndicator for TerminalIndicator {
    fn set_visible(&self, visible: bool) {
        let was_visible = self.visible.swap(visible, Ordering::SeqCst);
        if visible && !was_visible {
            write_line(&self.out, "bot is typing…");
        }
    }
}

/// Page whose container and indicator print to a writer.
pub struct TerminalPage {
    out: Output,
    input: TerminalInput,
    messages: TerminalMessages,
    indicator: TerminalIndicator,
}

impl std::fmt::Debug for TerminalPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminalPage")
            .field("input", &self.input)
            .finish_non_exhaustive()
    }
}

impl TerminalPage {
    /// Page printing to stdout.
    pub fn stdout(welcome: &str) -> Self {
        Self::new(Box::new(std::io::stdout()), welcome)
    }

    pub fn new(writer: Box<dyn Write + Send>, welcome: &str) -> Self {
        let out: Output = Arc::new(Mutex::new(writer));
        Self {
            input: TerminalInput::default(),
            messages: TerminalMessages {
                out: Arc::clone(&out),
                welcome: welcome.to_string(),
            },
            indicator: TerminalIndicator {
                out: Arc::clone(&out),
                visible: AtomicBool::new(false),
            },
            out,
        }
    }

    /// Print the static welcome block and the numbered quick replies.
    pub fn print_banner(&self, quick_replies: &[String]) {
        write_line(&self.out, &self.messages.welcome);
        if !quick_replies.is_empty() {
            write_line(&self.out, "Quick replies:");
            for (i, reply) in quick_replies.iter().enumerate() {
                write_line(&self.out, &format!("  /quick {} → {reply}", i + 1));
            }
        }
        write_line(
            &self.out,
            "Enter sends; end a line with \\ for a new line. /reset /export /help /quit",
        );
    }

    /// Print a host-level line outside the conversation.
    pub fn print(&self, line: &str) {
        write_line(&self.out, line);
    }

    /// Append `text` to the input buffer, optionally followed by a newline.
    pub fn type_text(&self, text: &str, newline: bool) {
        let mut value = self.input.value();
        value.push_str(text);
        if newline {
            value.push('\n');
        }
        self.input.set_value(&value);
    }
}

impl Page for TerminalPage {
    fn input(&self) -> Option<&dyn TextInput> {
        Some(&self.input)
    }

    fn messages(&self) -> Option<&dyn MessageContainer> {
        Some(&self.messages)
    }

    fn typing_indicator(&self) -> Option<&dyn TypingIndicator> {
        Some(&self.indicator)
    }
}
