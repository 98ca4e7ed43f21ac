//! Logging Setup
//!
//! Installs a `tracing` subscriber with:
//! - A human-readable stdout layer
//! - An optional daily-rolling JSON file layer (tracing-appender)
//! - `log` macros redirected into `tracing`
//!
//! The filter defaults to `info` and `RUST_LOG` overrides it.

use std::fs;
use std::io;
use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Default log file prefix; files roll daily as `<prefix>.YYYY-MM-DD`.
pub const DEFAULT_LOG_FILE: &str = "cast-of-thousands.log";

/// Where and how verbosely to log.
#[derive(Debug, Clone)]
pub struct LoggingOptions {
    /// Filter directive used when `RUST_LOG` is unset.
    pub default_directive: String,
    /// Directory for the rolling file layer. `None` disables it.
    pub log_dir: Option<PathBuf>,
    pub file_name: String,
    /// Emit the stdout layer.
    pub stdout: bool,
}

impl Default for LoggingOptions {
    fn default() -> Self {
        Self {
            default_directive: "info".to_string(),
            log_dir: None,
            file_name: DEFAULT_LOG_FILE.to_string(),
            stdout: true,
        }
    }
}

impl LoggingOptions {
    pub fn with_directive(mut self, directive: impl Into<String>) -> Self {
        self.default_directive = directive.into();
        self
    }

    pub fn with_log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(dir.into());
        self
    }

    /// Log to the per-user data directory.
    pub fn with_default_log_dir(self) -> Self {
        let dir = dirs::data_dir()
            .map(|d| d.join("cast-of-thousands").join("logs"))
            .unwrap_or_else(|| PathBuf::from("logs"));
        self.with_log_dir(dir)
    }

    pub fn without_stdout(mut self) -> Self {
        self.stdout = false;
        self
    }

    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&self.default_directive))
            .unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

/// Initialize logging.
///
/// Returns the file writer's `WorkerGuard` when a file layer was installed;
/// keep it alive so buffered lines are flushed on shutdown. If a global
/// subscriber is already installed, the call reports that and changes nothing.
pub fn init(options: &LoggingOptions) -> Option<WorkerGuard> {
    let (file_layer, guard) = match &options.log_dir {
        Some(log_dir) => {
            if !log_dir.exists() {
                if let Err(e) = fs::create_dir_all(log_dir) {
                    eprintln!("Failed to create logs directory: {}", e);
                }
            }
            let file_appender = tracing_appender::rolling::daily(log_dir, &options.file_name);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .json()
                .with_file(true)
                .with_line_number(true)
                .with_target(true)
                .with_filter(options.env_filter());
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let stdout_layer = options.stdout.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(io::stdout)
            .with_target(false)
            .with_filter(options.env_filter())
    });

    if let Err(e) = tracing_subscriber::registry()
        .with(file_layer)
        .with(stdout_layer)
        .try_init()
    {
        tracing::debug!("Logging already initialized: {}", e);
        return None;
    }

    // `log` records from dependencies end up in the same subscriber
    if let Err(e) = tracing_log::LogTracer::init() {
        tracing::debug!("LogTracer not installed: {}", e);
    }

    if let Some(dir) = &options.log_dir {
        log::info!(
            "Logging initialized. Writing to: {:?} (daily rolling)",
            dir.join(&options.file_name)
        );
    }
    guard
}
