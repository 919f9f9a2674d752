//!
//! src/logging.rs  Andrew Belles  Oct 2025
//!
//! Initializes logger so that a scheduled run leaves an
//! informative trail of what it selected and changed
//!
//!

use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use tracing_error::ErrorLayer;
use tracing_appender::non_blocking;

use crate::config::{LogFormat, LoggingConfig};
use crate::errors::CurateError;

pub struct LoggingGuard(tracing_appender::non_blocking::WorkerGuard);

pub fn init_logging(cfg: &LoggingConfig) -> Result<LoggingGuard, CurateError> {
    let (writer, guard) = non_blocking(std::io::stdout());
    let filter = std::env::var("RUST_LOG")
        .ok()
        .map(EnvFilter::new)
        .unwrap_or_else(|| EnvFilter::new(cfg.filter_directives.clone()));

    let time = fmt::time::UtcTime::rfc_3339();
    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(ErrorLayer::default());

    match cfg.format {
        LogFormat::Json => {
            let fmt_layer = fmt::layer()
                .with_writer(writer)
                .with_timer(time)
                .with_target(cfg.include_target)
                .with_file(cfg.include_file_line)
                .with_line_number(cfg.include_file_line)
                .json()
                .flatten_event(true)
                .with_current_span(true)
                .with_span_list(true);
            registry.with(fmt_layer).init();
        }
        LogFormat::Pretty => {
            let fmt_layer = fmt::layer()
                .with_writer(writer)
                .with_timer(time)
                .with_ansi(cfg.with_ansi)
                .with_target(cfg.include_target)
                .with_file(cfg.include_file_line)
                .with_line_number(cfg.include_file_line);
            registry.with(fmt_layer).init();
        }
    }

    Ok( LoggingGuard(guard) )
}
