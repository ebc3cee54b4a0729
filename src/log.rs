use crate::error::{Error, Result};
use once_cell::sync::OnceCell;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

static LOG_GUARD: OnceCell<Option<WorkerGuard>> = OnceCell::new();

/// Installs the global subscriber. With `log_file` set, output goes through a
/// non-blocking file appender, otherwise to stderr. Later calls are no-ops.
/// `RUST_LOG` takes precedence over `level`.
pub fn init_tracing(log_file: Option<&Path>, level: &str) -> Result<()> {
    LOG_GUARD
        .get_or_try_init(|| {
            let filter = EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(level))
                .map_err(|e| Error::Logging(e.to_string()))?;

            let Some(log_file) = log_file else {
                tracing_subscriber::fmt()
                    .with_env_filter(filter)
                    .with_writer(std::io::stderr)
                    .try_init()
                    .map_err(|e| Error::Logging(e.to_string()))?;
                return Ok(None);
            };

            let directory = log_file
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let file_name = log_file
                .file_name()
                .ok_or_else(|| Error::Logging(format!("invalid log file {}", log_file.display())))?;

            std::fs::create_dir_all(directory).map_err(|e| Error::io(directory, e))?;
            let appender = tracing_appender::rolling::never(directory, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);

            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .with_thread_names(true)
                .try_init()
                .map_err(|e| Error::Logging(e.to_string()))?;

            Ok(Some(guard))
        })
        .map(|_| ())
}
