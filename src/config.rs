//! Layered configuration: defaults, config file, environment, CLI flags.
//!
//! Priority: CLI flag > `CHAT_WIDGET__*` env var > config file > defaults.
//! The config file is `--config` / `CHAT_WIDGET_CONFIG` when given, else
//! `./chat-widget.{yaml,toml,json}` if one exists.

use std::time::Duration;

use clap::{Parser, ValueEnum};
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::widget::WidgetSettings;
use crate::widget::rules::WELCOME_TEXT;
use crate::widget::scheduler::DelayRange;

/// Base name of the optional config file in the working directory.
const DEFAULT_CONFIG_BASENAME: &str = "chat-widget";

/// Quick replies offered by the terminal host out of the box.
const DEFAULT_QUICK_REPLIES: [&str; 3] = [
    "What can you help me with?",
    "Show me the features",
    "How do I reset the chat?",
];

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CHAT_WIDGET_CONFIG")]
    pub config: Option<String>,

    /// Lower bound of the simulated reply delay (ms)
    #[arg(long)]
    pub reply_delay_min_ms: Option<u64>,

    /// Upper bound of the simulated reply delay (ms)
    #[arg(long)]
    pub reply_delay_max_ms: Option<u64>,

    /// Cancel replies still pending when the conversation is reset
    #[arg(long)]
    pub cancel_pending_on_reset: Option<bool>,

    /// Reject messages longer than this many characters
    #[arg(long)]
    pub max_input_chars: Option<u64>,

    /// Write widget events to stderr as JSON lines
    #[arg(long)]
    pub emit_events: Option<bool>,

    /// Log output format
    #[arg(long, value_enum)]
    pub log_format: Option<LogFormat>,
}

#[derive(Debug, Clone, Copy, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Compact,
    Json,
}

impl LogFormat {
    fn as_str(self) -> &'static str {
        match self {
            Self::Compact => "compact",
            Self::Json => "json",
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub widget: WidgetConfig,
    pub host: HostConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WidgetConfig {
    pub reply_delay_min_ms: u64,
    pub reply_delay_max_ms: u64,
    pub scroll_delay_ms: u64,
    pub reset_delay_ms: u64,
    pub cancel_pending_on_reset: bool,
    #[serde(default)]
    pub max_input_chars: Option<usize>,
    pub welcome_text: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HostConfig {
    pub emit_events: bool,
    pub quick_replies: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub format: LogFormat,
    /// Used when `RUST_LOG` is unset.
    pub filter: String,
}

impl WidgetConfig {
    /// Validate and convert into runtime settings.
    pub fn settings(&self) -> Result<WidgetSettings> {
        let reply_delay = DelayRange::new(
            Duration::from_millis(self.reply_delay_min_ms),
            Duration::from_millis(self.reply_delay_max_ms),
        )
        .ok_or_else(|| {
            Error::InvalidConfig(format!(
                "widget.reply_delay_min_ms ({}) exceeds widget.reply_delay_max_ms ({})",
                self.reply_delay_min_ms, self.reply_delay_max_ms
            ))
        })?;

        if self.max_input_chars == Some(0) {
            return Err(Error::InvalidConfig(
                "widget.max_input_chars must be greater than zero".to_string(),
            ));
        }

        Ok(WidgetSettings {
            reply_delay,
            scroll_delay: Duration::from_millis(self.scroll_delay_ms),
            reset_delay: Duration::from_millis(self.reset_delay_ms),
            cancel_pending_on_reset: self.cancel_pending_on_reset,
            max_input_chars: self.max_input_chars,
            welcome_text: self.welcome_text.clone(),
        })
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        Self::load_from_args(std::env::args())
    }

    pub fn load_from_args<I, T>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli =
            Cli::try_parse_from(args).map_err(|e| config::ConfigError::Message(e.to_string()))?;

        let mut builder = Config::builder();

        // 1. Defaults
        builder = builder
            .set_default("widget.reply_delay_min_ms", 600)?
            .set_default("widget.reply_delay_max_ms", 1200)?
            .set_default("widget.scroll_delay_ms", 100)?
            .set_default("widget.reset_delay_ms", 300)?
            .set_default("widget.cancel_pending_on_reset", false)?
            .set_default("widget.welcome_text", WELCOME_TEXT)?
            .set_default("host.emit_events", false)?
            .set_default("host.quick_replies", DEFAULT_QUICK_REPLIES.to_vec())?
            .set_default("logging.format", LogFormat::Compact.as_str())?
            .set_default("logging.filter", "info,chat_widget=debug")?;

        // 2. Config file
        builder = match &cli.config {
            Some(path) => builder.add_source(File::with_name(path)),
            None => builder.add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false)),
        };

        // 3. Environment, e.g. CHAT_WIDGET__WIDGET__REPLY_DELAY_MAX_MS=2000
        builder = builder.add_source(
            Environment::with_prefix("CHAT_WIDGET")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        // 4. CLI flags
        if let Some(ms) = cli.reply_delay_min_ms {
            builder = builder.set_override("widget.reply_delay_min_ms", ms)?;
        }
        if let Some(ms) = cli.reply_delay_max_ms {
            builder = builder.set_override("widget.reply_delay_max_ms", ms)?;
        }
        if let Some(cancel) = cli.cancel_pending_on_reset {
            builder = builder.set_override("widget.cancel_pending_on_reset", cancel)?;
        }
        if let Some(limit) = cli.max_input_chars {
            builder = builder.set_override("widget.max_input_chars", limit)?;
        }
        if let Some(emit) = cli.emit_events {
            builder = builder.set_override("host.emit_events", emit)?;
        }
        if let Some(format) = cli.log_format {
            builder = builder.set_override("logging.format", format.as_str())?;
        }

        let cfg: Self = builder.build()?.try_deserialize()?;
        cfg.widget.settings()?;
        Ok(cfg)
    }
}
