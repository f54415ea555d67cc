use std::path::Path;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Keeps the non-blocking file writer alive; dropping it flushes and stops
/// the background worker.
#[allow(dead_code)]
pub struct LoggerGuard(Option<WorkerGuard>);

/// Install the global tracing subscriber: a console layer, plus a
/// daily-rolling file layer when `log_dir` is given. `RUST_LOG` overrides
/// the default `level`.
pub fn init_logging(log_dir: Option<&Path>, prefix: &str, level: &str) -> LoggerGuard {
    let level = match level {
        "trace" | "debug" | "info" | "warn" | "error" => level,
        _ => "info",
    };

    let builder = EnvFilter::builder().with_default_directive(level.parse().unwrap());
    let console_filter =
        builder.clone().parse_lossy(&std::env::var("RUST_LOG").unwrap_or_default());

    let stdout_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_ansi(true)
        .with_filter(console_filter);

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let file_filter =
                builder.parse_lossy(&std::env::var("RUST_LOG").unwrap_or_default());
            let file_appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix(prefix)
                .filename_suffix("log")
                .build(dir)
                .expect("Failed to create file appender");
            let (non_blocking, guard) = NonBlocking::new(file_appender);
            let layer = fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_filter(file_filter);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stdout_layer)
        .init();

    LoggerGuard(guard)
}
