use crate::bench_error::BenchError;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const LOG_FILE_NAME: &str = "paxos-bench.log";

/// Installs the global subscriber: stdout plus a non-blocking file writer in `log_dir`.
/// `RUST_LOG` takes precedence over `default_level`. The returned guard must be kept alive
/// for the file writer to flush.
pub fn init_logging(default_level: &str, log_dir: &Path) -> Result<WorkerGuard, BenchError> {
    std::fs::create_dir_all(log_dir)?;
    let file_appender = tracing_appender::rolling::never(log_dir, LOG_FILE_NAME);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|error| {
            BenchError::ConfigurationError(format!("invalid log level {default_level}: {error}"))
        })?;

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(fmt::layer().with_ansi(false).with_writer(file_writer))
        .try_init()
        .map_err(|error| BenchError::ConfigurationError(error.to_string()))?;

    Ok(guard)
}
