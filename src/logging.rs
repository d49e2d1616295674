//! Process-wide logging setup: one console sink and one file sink
//! under `<dir>/<app_name>.log`.

use std::fmt;
use std::path::PathBuf;

use chrono::Local;
use once_cell::sync::OnceCell;
use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

use crate::error::{Error, Result};

// Keeps the non-blocking writer flushing for the process lifetime.
static LOG_GUARD: OnceCell<WorkerGuard> = OnceCell::new();

/// Timestamp shared by both sinks.
struct LocalStamp;

impl FormatTime for LocalStamp {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        write!(w, "{}", Local::now().format("%d-%m-%Y  %H:%M"))
    }
}

/// Logging settings, constructed once at process start and passed to
/// [`init`]. The defaults match what the admin scripts expect: INFO on
/// the console, DEBUG in the file.
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub app_name: String,
    pub dir: PathBuf,
    pub console_level: LevelFilter,
    pub file_level: LevelFilter,
    /// How the file sink rotates. With [`Rotation::NEVER`] everything
    /// lands in `<dir>/<app_name>.log`; rotated files carry a date in
    /// the name.
    pub rotation: Rotation,
    /// Rotated files kept on disk.
    pub max_files: usize,
}

impl LogConfig {
    pub fn new(app_name: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Self {
            app_name: app_name.into(),
            dir: dir.into(),
            console_level: LevelFilter::INFO,
            file_level: LevelFilter::DEBUG,
            rotation: Rotation::NEVER,
            max_files: 7,
        }
    }

    /// `<dir>/<app_name>.log`
    pub fn log_file_path(&self) -> PathBuf {
        self.dir.join(format!("{}.log", self.app_name))
    }
}

/// Install the global subscriber. Fails if the log directory cannot
/// take the file or if logging was already configured in this process;
/// reconfiguring is not supported.
pub fn init(config: &LogConfig) -> Result<()> {
    let appender = RollingFileAppender::builder()
        .rotation(config.rotation.clone())
        .filename_prefix(&config.app_name)
        .filename_suffix("log")
        .max_log_files(config.max_files)
        .build(&config.dir)
        .map_err(|e| {
            Error::Logging(format!(
                "cannot open log file in {}: {e}",
                config.dir.display()
            ))
        })?;
    let (file_writer, guard) = tracing_appender::non_blocking(appender);

    let console_layer = tracing_subscriber::fmt::layer()
        .with_timer(LocalStamp)
        .with_writer(std::io::stdout)
        .with_filter(config.console_level);
    let file_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_timer(LocalStamp)
        .with_writer(file_writer)
        .with_filter(config.file_level);

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| Error::Logging(format!("already configured: {e}")))?;

    LOG_GUARD
        .set(guard)
        .map_err(|_| Error::Logging("already configured".into()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::{debug, info};

    #[test]
    fn log_file_path_joins_app_name() {
        let config = LogConfig::new("nightly-report", "/var/log/vc");
        assert_eq!(
            config.log_file_path(),
            PathBuf::from("/var/log/vc/nightly-report.log")
        );
    }

    #[test]
    fn init_writes_both_levels_and_rejects_reconfiguration() {
        let dir = tempfile::tempdir().unwrap();
        let config = LogConfig::new("helper", dir.path());

        init(&config).unwrap();
        info!("inventory sweep started");
        debug!("fetched 3 objects");

        assert!(init(&config).is_err());

        // The writer is non-blocking; give the worker a moment.
        std::thread::sleep(std::time::Duration::from_millis(300));
        let written = std::fs::read_to_string(config.log_file_path()).unwrap();
        assert!(written.contains("inventory sweep started"));
        assert!(written.contains("fetched 3 objects"));
    }
}
