//! Chat widget terminal host.
//!
//! Entry point for running the widget against stdin/stdout.

use anyhow::Context;
use dotenvy::dotenv;
use mimalloc::MiMalloc;

use chat_widget::config::AppConfig;
use chat_widget::{host, telemetry};

/// Global allocator for improved performance (M-MIMALLOC-APPS).
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env (if present)
    let _ = dotenv();

    let config = AppConfig::load().context("failed to load configuration")?;

    // Initialize tracing (M-LOG-STRUCTURED)
    telemetry::init(&config.logging);

    tracing::info!(
        name: "widget.config.loaded",
        reply_delay_min_ms = config.widget.reply_delay_min_ms,
        reply_delay_max_ms = config.widget.reply_delay_max_ms,
        cancel_pending_on_reset = config.widget.cancel_pending_on_reset,
        "Widget configuration loaded"
    );

    host::run(config).await.context("terminal host failed")
}
