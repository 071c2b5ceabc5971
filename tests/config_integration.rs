use chat_widget::Error;
use chat_widget::config::{AppConfig, LogFormat};
use serial_test::serial;
use std::env;
use std::fs;

// Helper to clear environment variables that might interfere with tests
fn clear_env_vars() {
    unsafe {
        env::remove_var("CHAT_WIDGET__WIDGET__REPLY_DELAY_MAX_MS");
        env::remove_var("CHAT_WIDGET__HOST__EMIT_EVENTS");
        env::remove_var("CHAT_WIDGET_CONFIG");
    }
}

fn load(args: &[&str]) -> chat_widget::Result<AppConfig> {
    AppConfig::load_from_args(std::iter::once("chat-widget").chain(args.iter().copied()))
}

#[test]
#[serial]
fn test_default_config() {
    clear_env_vars();

    let config = load(&[]).expect("defaults should load");
    assert_eq!(config.widget.reply_delay_min_ms, 600);
    assert_eq!(config.widget.reply_delay_max_ms, 1200);
    assert_eq!(config.widget.scroll_delay_ms, 100);
    assert_eq!(config.widget.reset_delay_ms, 300);
    assert!(!config.widget.cancel_pending_on_reset);
    assert_eq!(config.widget.max_input_chars, None);
    assert!(!config.host.emit_events);
    assert_eq!(config.host.quick_replies.len(), 3);
    assert_eq!(config.logging.format, LogFormat::Compact);
}

#[test]
#[serial]
fn test_env_override() {
    clear_env_vars();
    unsafe {
        env::set_var("CHAT_WIDGET__WIDGET__REPLY_DELAY_MAX_MS", "2500");
        env::set_var("CHAT_WIDGET__HOST__EMIT_EVENTS", "true");
    }

    let config = load(&[]).expect("Failed to load config");
    assert_eq!(config.widget.reply_delay_max_ms, 2500);
    assert!(config.host.emit_events);

    clear_env_vars();
}

#[test]
#[serial]
fn test_file_load() {
    clear_env_vars();

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let file_path = dir.path().join("widget.yaml");
    fs::write(
        &file_path,
        r#"
widget:
  reply_delay_min_ms: 100
  reply_delay_max_ms: 200
  max_input_chars: 2000
host:
  quick_replies:
    - "help"
"#,
    )
    .expect("Failed to write temp config");

    unsafe {
        env::set_var("CHAT_WIDGET_CONFIG", &file_path);
    }

    let config = load(&[]).expect("Failed to load config from file");
    assert_eq!(config.widget.reply_delay_min_ms, 100);
    assert_eq!(config.widget.reply_delay_max_ms, 200);
    assert_eq!(config.widget.max_input_chars, Some(2000));
    assert_eq!(config.host.quick_replies, vec!["help".to_string()]);
    // Untouched keys keep their defaults.
    assert_eq!(config.widget.reset_delay_ms, 300);

    clear_env_vars();
}

#[test]
#[serial]
fn test_cli_beats_env() {
    clear_env_vars();
    unsafe {
        env::set_var("CHAT_WIDGET__WIDGET__REPLY_DELAY_MAX_MS", "2500");
    }

    let config = load(&[
        "--reply-delay-max-ms",
        "900",
        "--cancel-pending-on-reset",
        "true",
        "--log-format",
        "json",
    ])
    .expect("Failed to load config");
    assert_eq!(config.widget.reply_delay_max_ms, 900);
    assert!(config.widget.cancel_pending_on_reset);
    assert_eq!(config.logging.format, LogFormat::Json);

    clear_env_vars();
}

#[test]
#[serial]
fn test_inverted_delays_rejected() {
    clear_env_vars();

    let result = load(&["--reply-delay-min-ms", "1500"]);
    assert!(matches!(result, Err(Error::InvalidConfig(_))));
}

#[test]
#[serial]
fn test_missing_explicit_file_is_error() {
    clear_env_vars();

    let result = load(&["--config", "/definitely/not/here.yaml"]);
    assert!(matches!(result, Err(Error::Config(_))));
}
