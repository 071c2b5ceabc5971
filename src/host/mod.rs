//! Terminal host for the widget.
//!
//! Plays the role of the host page: stdin lines become keystrokes in the
//! input field, slash commands invoke the remaining entry points, and the
//! container prints to stdout.

mod terminal;

pub use terminal::TerminalPage;

use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::error::Result;
use crate::events::event_line;
use crate::widget::{ChatWidget, KeyEvent, KeyOutcome, Page};

/// Poll interval while waiting for pending replies on exit.
const DRAIN_POLL: Duration = Duration::from_millis(50);

/// One parsed line of terminal input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Text ending in `\`: Shift+Enter, the line continues.
    Continue(String),
    /// Text followed by Enter.
    Send(String),
    /// `/quick N` (1-based).
    Quick(usize),
    Reset,
    Export,
    Help,
    Quit,
    /// Unrecognized slash command.
    Unknown(String),
}

impl Command {
    #[must_use]
    pub fn parse(line: &str) -> Self {
        let line = line.trim_end_matches(['\r', '\n']);

        if let Some(rest) = line.strip_prefix('/') {
            let mut parts = rest.split_whitespace();
            return match (parts.next(), parts.next()) {
                (Some("reset"), None) => Self::Reset,
                (Some("export"), None) => Self::Export,
                (Some("help"), None) => Self::Help,
                (Some("quit" | "exit"), None) => Self::Quit,
                (Some("quick"), Some(n)) => match n.parse::<usize>() {
                    Ok(n) if n > 0 => Self::Quick(n),
                    _ => Self::Unknown(line.to_string()),
                },
                _ => Self::Unknown(line.to_string()),
            };
        }

        match line.strip_suffix('\\') {
            Some(text) => Self::Continue(text.to_string()),
            None => Self::Send(line.to_string()),
        }
    }
}

/// Run the terminal host until `/quit` or end of input.
pub async fn run(config: AppConfig) -> Result<()> {
    let settings = config.widget.settings()?;
    let page = Arc::new(TerminalPage::stdout(&settings.welcome_text));
    let widget = ChatWidget::new(Arc::clone(&page) as Arc<dyn Page>, settings);

    if config.host.emit_events {
        spawn_event_writer(&widget);
    }

    page.print_banner(&config.host.quick_replies);
    widget.init();

    let mut stdin = BufReader::new(tokio::io::stdin());
    let mut buf = Vec::new();
    while let Some(line) = read_line(&mut stdin, &mut buf).await? {
        if !dispatch(&widget, &page, &config.host.quick_replies, Command::parse(&line))? {
            break;
        }
    }

    drain(&widget).await;
    info!(name: "host.exit", widget_id = %widget.id(), messages = widget.history_len(), "Host exiting");
    Ok(())
}

/// Read one line, replacing invalid UTF-8 instead of failing.
///
/// Returns `None` at end of input.
pub async fn read_line<R>(reader: &mut R, buf: &mut Vec<u8>) -> Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    if reader.read_until(b'\n', buf).await? == 0 {
        return Ok(None);
    }

    let line = String::from_utf8_lossy(buf);
    if let Cow::Owned(_) = line {
        debug!(name: "host.input.lossy", bytes = buf.len(), "Replaced invalid UTF-8 in input");
    }
    Ok(Some(line.into_owned()))
}

/// Apply one command. Returns `false` when the host should stop.
pub fn dispatch(
    widget: &ChatWidget,
    page: &TerminalPage,
    quick_replies: &[String],
    command: Command,
) -> Result<bool> {
    match command {
        Command::Continue(text) => {
            page.type_text(&text, false);
            press(widget, page, KeyEvent::shift_enter());
        }
        Command::Send(text) => {
            page.type_text(&text, false);
            press(widget, page, KeyEvent::enter());
        }
        Command::Quick(n) => match n.checked_sub(1).and_then(|i| quick_replies.get(i)) {
            Some(reply) => widget.send_suggested_reply(reply),
            None => page.print(&format!("No quick reply #{n}")),
        },
        Command::Reset => widget.reset_conversation(),
        Command::Export => page.print(&widget.transcript().to_json()?),
        Command::Help => page.print(
            "/quick N  send quick reply N\n/reset    clear the conversation\n\
             /export   print the transcript as JSON\n/quit     exit",
        ),
        Command::Quit => return Ok(false),
        Command::Unknown(line) => page.print(&format!("Unknown command: {line}")),
    }
    Ok(true)
}

/// Deliver a keypress; native behavior for Enter is a line break.
fn press(widget: &ChatWidget, page: &TerminalPage, event: KeyEvent) {
    if widget.handle_keyboard_submit(&event) == KeyOutcome::Default {
        page.type_text("", true);
    }
}

fn spawn_event_writer(widget: &ChatWidget) {
    let mut events = widget.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => eprintln!("{}", event_line(&event)),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(name: "host.events.lagged", skipped, "Event writer fell behind");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });
}

/// Wait for scheduled replies, then for the trailing scroll/reset timers.
async fn drain(widget: &ChatWidget) {
    while widget.pending_replies() > 0 {
        tokio::time::sleep(DRAIN_POLL).await;
    }
    let settings = widget.settings();
    tokio::time::sleep(settings.reset_delay.max(settings.scroll_delay)).await;
}
