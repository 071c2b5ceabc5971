//! Chat Widget
//!
//! A chat widget that simulates a conversational assistant entirely on the
//! client: it renders user and bot messages, shows a typing indicator, and
//! answers with canned responses picked by keyword matching.
//!
//! # Architecture
//!
//! - **State**: pure conversation log and response selection
//! - **Rendering**: a host page contract with guarded element lookups
//! - **Scheduling**: tokio timers for simulated latency, scroll and reset
//! - **Host**: a terminal page driving the widget from stdin
//!
//! # Modules
//!
//! - [`widget`]: widget controller, state, rules and page contract
//! - [`events`]: event stream published by each widget
//! - [`config`]: layered configuration
//! - [`host`]: terminal host

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::cargo_common_metadata)]
#![allow(clippy::multiple_crate_versions)]

pub mod config;
pub mod error;
pub mod events;
pub mod host;
pub mod telemetry;
pub mod widget;

pub use error::{Error, Result};
pub use widget::ChatWidget;
