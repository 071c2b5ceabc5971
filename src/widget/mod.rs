//! Chat widget core.
//!
//! # Architecture
//!
//! - [`state`]: pure conversation state, input validation, transcripts
//! - [`rules`]: canned response table and keyword matching
//! - [`page`]: host page contract (elements by fixed id, keyboard events)
//! - [`render`]: applies state changes to the page
//! - [`scheduler`]: delayed tasks with cancellation handles
//! - [`controller`]: the [`ChatWidget`] entry points
//! - [`memory`]: in-memory page implementation
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use chat_widget::widget::{ChatWidget, MemoryPage, Page, WidgetSettings};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let page = Arc::new(MemoryPage::new());
//! let widget = ChatWidget::new(Arc::clone(&page) as Arc<dyn Page>, WidgetSettings::default());
//! widget.init();
//!
//! page.type_text("What features do you have?");
//! widget.submit();
//! assert!(widget.is_typing());
//! # }
//! ```

pub mod controller;
pub mod memory;
pub mod message;
pub mod page;
pub mod render;
pub mod rules;
pub mod scheduler;
pub mod state;

pub use controller::{ChatWidget, WidgetSettings};
pub use memory::MemoryPage;
pub use message::{ChatMessage, Role};
pub use page::{Key, KeyEvent, KeyOutcome, Page};
pub use rules::{ResponseRule, RuleKey, select_response};
pub use state::{ChatState, Transcript};
