//! Structured logging setup for the simulator
//!
//! Human-readable events go to stderr. When a log directory is given, the
//! same events are also written as JSON lines to `simulation.log` through a
//! non-blocking writer. `RUST_LOG` overrides the default `info` filter.

use crate::error::Result;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// File name used inside the log directory
pub const LOG_FILE_NAME: &str = "simulation.log";

/// Install the global subscriber.
///
/// The returned guard flushes the file writer when dropped, so hold it for
/// the lifetime of the program. Installing twice is not an error; the first
/// subscriber stays in place.
pub fn init_logging(log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let appender = tracing_appender::rolling::never(dir, LOG_FILE_NAME);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .json()
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .try_init();

    Ok(guard)
}
