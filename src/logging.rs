use std::fs;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Directive applied when RUST_LOG does not mention this crate.
const DEFAULT_DIRECTIVE: &str = "tabular_etl=info";

/// Initializes the logging system with console and file output.
pub fn init_logging() {
    let _ = fs::create_dir_all("logs");

    // Daily-rotated JSON log file, written off the hot path
    let file_appender = tracing_appender::rolling::daily("logs", "etl.log");
    let (non_blocking_writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer().json().with_writer(non_blocking_writer);
    let console_layer = fmt::layer().with_writer(std::io::stdout);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(DEFAULT_DIRECTIVE.parse().unwrap()))
        .with(file_layer)
        .with(console_layer)
        .init();

    // The guard must outlive main or buffered records never reach disk
    std::mem::forget(guard);
}
