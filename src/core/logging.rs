//! Logging Setup
//!
//! Installs the global `tracing` subscriber:
//! - stderr output for humans
//! - optional daily-rolling JSON log file
//! - `log` crate records bridged into `tracing` by `try_init`
//! - miette report hook for CLI errors

use std::io;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::LoggingConfig;

/// Base name of the rolling log file.
pub const LOG_FILE_NAME: &str = "gm-statblocks.log";

/// Level used when neither `RUST_LOG` nor the configured level parses.
pub const DEFAULT_LEVEL: &str = "warn";

/// Initialize logging.
///
/// Both layers filter with `RUST_LOG`, else `config.level`. Returns the
/// appender's `WorkerGuard` when file logging is on; keep it alive until
/// exit so buffered lines are flushed.
pub fn init(config: &LoggingConfig, log_dir: &Path) -> Option<WorkerGuard> {
    let (file_layer, guard) = if config.file_logging {
        match std::fs::create_dir_all(log_dir) {
            Ok(()) => {
                let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_NAME);
                let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
                let layer = tracing_subscriber::fmt::layer()
                    .with_writer(non_blocking)
                    .json()
                    .with_file(true)
                    .with_line_number(true)
                    .with_target(true)
                    .with_filter(level_filter(config));
                (Some(layer), Some(guard))
            }
            Err(e) => {
                eprintln!("Failed to create logs directory {}: {}", log_dir.display(), e);
                (None, None)
            }
        }
    } else {
        (None, None)
    };

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .with_filter(level_filter(config));

    if let Err(e) = tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
    {
        eprintln!("Failed to initialize tracing subscriber: {}", e);
    }

    init_miette();

    if guard.is_some() {
        log::info!(
            "Logging initialized. Writing to: {:?} (daily rolling)",
            log_dir.join(LOG_FILE_NAME)
        );
    }

    guard
}

fn level_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL))
}

/// Configure miette's graphical report handler for CLI errors.
pub fn init_miette() {
    let colors = console::colors_enabled_stderr();

    miette::set_hook(Box::new(move |_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .context_lines(2)
                .tab_width(4)
                .break_words(true)
                .color(colors)
                .build(),
        )
    }))
    .ok(); // Ignore if already set
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_filter_uses_configured_level() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let config = LoggingConfig {
            level: "debug".to_string(),
            file_logging: false,
        };
        assert_eq!(level_filter(&config).to_string(), "debug");

        let bad = LoggingConfig {
            level: "gm_statblocks=loud".to_string(),
            file_logging: false,
        };
        assert_eq!(level_filter(&bad).to_string(), DEFAULT_LEVEL);
    }

    #[test]
    fn test_init_without_file_logging_returns_no_guard() {
        let dir = tempfile::tempdir().unwrap();
        let config = LoggingConfig {
            file_logging: false,
            ..Default::default()
        };
        assert!(init(&config, dir.path()).is_none());
        // A second call must not fail or install a second `log` bridge.
        assert!(init(&config, dir.path()).is_none());
    }
}
