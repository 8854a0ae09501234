//! Logging setup for the portal.
//!
//! One subscriber per process: an `EnvFilter` (`RUST_LOG` wins over the
//! configured level), a formatted stdout layer, and optionally a daily rolling
//! file and journald.

use portal_config::LoggingConfig;
use tracing::{info, Level};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// File name prefix of the rolling log inside `LoggingConfig::directory`.
pub const LOG_FILE_PREFIX: &str = "portal.log";

/// Initialize the tracing subscriber from the logging configuration.
///
/// Returns the guard of the non-blocking file writer when file logging is on;
/// keep it alive for as long as the process should write to the file.
pub fn init(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_str()));

    let stdout_layer = fmt::layer()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_thread_ids(true);

    let (file_layer, guard) = match config.directory.as_deref() {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let subscriber = tracing_subscriber::registry()
        .with(stdout_layer)
        .with(file_layer)
        .with(filter);

    #[cfg(target_os = "linux")]
    let subscriber = subscriber.with(journald_layer(config.journald));

    // try_init: tests and embedders may already have installed a subscriber
    if subscriber.try_init().is_ok() {
        info!(
            "Logging initialized at level: {} (file: {}, journald: {})",
            config.level,
            config.directory.as_deref().unwrap_or("off"),
            config.journald
        );
    }

    guard
}

/// Initialize with a fixed level and stdout only.
pub fn init_with_level(level: Level) {
    let config = LoggingConfig {
        level: level.to_string().to_lowercase(),
        ..LoggingConfig::default()
    };
    // no file layer, so there is no guard to keep
    let _ = init(&config);
}

#[cfg(target_os = "linux")]
fn journald_layer(enabled: bool) -> Option<tracing_journald::Layer> {
    if !enabled {
        return None;
    }
    match tracing_journald::layer() {
        Ok(layer) => Some(layer),
        Err(err) => {
            eprintln!("journald unavailable, continuing without it: {}", err);
            None
        }
    }
}
