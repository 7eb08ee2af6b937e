use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, prelude::*};

/// Directory holding rolling log files (`~/.classdex/logs`).
pub fn log_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".classdex/logs")
}

/// Install the global subscriber: a daily rolling `<component>.log` under
/// [`log_dir`] and, when `to_stderr` is set, a colored stderr layer.
/// `RUST_LOG` overrides the default `info` level.
///
/// A host that already installed a subscriber keeps it; the file layer is
/// then never attached. Keep the returned guard alive to flush the file.
pub fn init_logging(component: &str, to_stderr: bool) -> WorkerGuard {
    let log_dir = log_dir();
    let _ = std::fs::create_dir_all(&log_dir);

    // scan.log.2024-01-21
    let file_appender = tracing_appender::rolling::daily(&log_dir, format!("{}.log", component));
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = vec![
        fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .boxed(),
    ];
    if to_stderr {
        layers.push(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true)
                .with_target(false)
                .boxed(),
        );
    }

    let installed = tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init();
    if installed.is_err() {
        tracing::debug!("global subscriber already set, {} logs stay with it", component);
    }

    guard
}
