//! Tracing subscriber setup.
//!
//! Installs a console layer and, when enabled, a daily-rolling file layer.
//! Logs go to an XDG-compliant location by default.

use crate::error::WorkflowError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// The `[logging]` configuration section.
///
/// By default, file logs go to `~/.local/share/agentic-workflow/logs/`.
///
/// # Example
///
/// ```rust
/// use agentic_workflow::logging::{LogLevel, LoggingConfig};
///
/// let config = LoggingConfig::new()
///     .with_app_name("my-agent")
///     .with_level(LogLevel::Debug);
/// assert!(config.enabled);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Whether file logging is enabled. Console output is always on.
    pub enabled: bool,
    /// Log files are named `{app_name}.log` with daily rotation.
    pub app_name: String,
    /// Custom log directory. If None, uses XDG data dir + "agentic-workflow/logs".
    pub log_dir: Option<PathBuf>,
    /// Default level; `RUST_LOG` overrides it.
    pub level: LogLevel,
}

impl LoggingConfig {
    /// Creates a new LoggingConfig with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration without file output.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    /// Sets the application name for log file naming.
    #[must_use]
    pub fn with_app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = name.into();
        self
    }

    /// Sets a custom log directory.
    #[must_use]
    pub fn with_log_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(path.into());
        self
    }

    /// Sets the log level filter.
    #[must_use]
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            app_name: crate::config::APP_NAME.to_string(),
            log_dir: None,
            level: LogLevel::default(),
        }
    }
}

/// Log level filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level - most verbose.
    Trace,
    /// Debug level.
    Debug,
    /// Info level - default.
    #[default]
    Info,
    /// Warn level.
    Warn,
    /// Error level - least verbose.
    Error,
}

impl LogLevel {
    /// Converts to tracing_subscriber LevelFilter.
    #[must_use]
    pub fn to_filter(self) -> tracing_subscriber::filter::LevelFilter {
        match self {
            Self::Trace => tracing_subscriber::filter::LevelFilter::TRACE,
            Self::Debug => tracing_subscriber::filter::LevelFilter::DEBUG,
            Self::Info => tracing_subscriber::filter::LevelFilter::INFO,
            Self::Warn => tracing_subscriber::filter::LevelFilter::WARN,
            Self::Error => tracing_subscriber::filter::LevelFilter::ERROR,
        }
    }
}

/// Keeps the non-blocking file writer flushing until process exit.
struct LoggingGuard {
    _guard: tracing_appender::non_blocking::WorkerGuard,
}

impl fmt::Debug for LoggingGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggingGuard").finish_non_exhaustive()
    }
}

static LOGGING_GUARD: std::sync::OnceLock<LoggingGuard> = std::sync::OnceLock::new();

/// Errors that can occur during logging initialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingError {
    /// The specific error that occurred.
    pub kind: LoggingErrorKind,
}

/// Specific logging error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoggingErrorKind {
    /// Failed to determine XDG data directory.
    NoDataDir,
    /// Failed to create log directory.
    CreateDirFailed {
        /// The path that could not be created.
        path: PathBuf,
        /// The reason for failure.
        reason: String,
    },
    /// Subscriber initialization failed.
    SubscriberInitFailed {
        /// The reason for failure.
        reason: String,
    },
}

impl LoggingError {
    /// Creates a new LoggingError with the given kind.
    #[must_use]
    pub fn new(kind: LoggingErrorKind) -> Self {
        Self { kind }
    }

    /// Creates an error for missing XDG data directory.
    #[must_use]
    pub fn no_data_dir() -> Self {
        Self::new(LoggingErrorKind::NoDataDir)
    }

    /// Creates an error for failed directory creation.
    #[must_use]
    pub fn create_dir_failed(path: PathBuf, reason: impl Into<String>) -> Self {
        Self::new(LoggingErrorKind::CreateDirFailed {
            path,
            reason: reason.into(),
        })
    }

    /// Creates an error for subscriber initialization failure.
    #[must_use]
    pub fn subscriber_init_failed(reason: impl Into<String>) -> Self {
        Self::new(LoggingErrorKind::SubscriberInitFailed {
            reason: reason.into(),
        })
    }

    /// Returns true if this is a missing data directory error.
    #[must_use]
    pub fn is_no_data_dir(&self) -> bool {
        matches!(self.kind, LoggingErrorKind::NoDataDir)
    }
}

impl fmt::Display for LoggingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            LoggingErrorKind::NoDataDir => {
                write!(
                    f,
                    "could not determine XDG data directory; \
                     set XDG_DATA_HOME or use a custom log_dir"
                )
            }
            LoggingErrorKind::CreateDirFailed { path, reason } => {
                write!(
                    f,
                    "failed to create log directory '{}': {}; check permissions",
                    path.display(),
                    reason
                )
            }
            LoggingErrorKind::SubscriberInitFailed { reason } => {
                write!(
                    f,
                    "failed to initialize tracing subscriber: {}; \
                     a subscriber may already be set",
                    reason
                )
            }
        }
    }
}

impl std::error::Error for LoggingError {}

impl From<LoggingError> for WorkflowError {
    fn from(error: LoggingError) -> Self {
        Self::logging(error.to_string())
    }
}

/// Returns the directory file logs are written to.
///
/// # Errors
///
/// Returns an error if no custom directory is set and the XDG data
/// directory cannot be determined.
pub fn log_dir(config: &LoggingConfig) -> Result<PathBuf, LoggingError> {
    if let Some(ref custom_dir) = config.log_dir {
        return Ok(custom_dir.clone());
    }

    dirs::data_local_dir()
        .map(|dir| dir.join(crate::config::APP_NAME).join("logs"))
        .ok_or_else(LoggingError::no_data_dir)
}

fn env_filter(level: LogLevel) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(level.to_filter().into())
        .from_env_lossy()
}

/// Installs the global subscriber.
///
/// The console layer writes to stderr. When `config.enabled` is set, a
/// daily-rolling file layer is added and its writer guard is kept for the
/// life of the process.
///
/// # Returns
///
/// `Ok(true)` if a file layer was installed, `Ok(false)` for console only.
///
/// # Errors
///
/// Returns an error if the log directory cannot be created or a global
/// subscriber is already set.
pub fn init(config: &LoggingConfig) -> Result<bool, LoggingError> {
    let console = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    if !config.enabled {
        return tracing_subscriber::registry()
            .with(env_filter(config.level))
            .with(console)
            .try_init()
            .map(|()| false)
            .map_err(|e| LoggingError::subscriber_init_failed(e.to_string()));
    }

    let dir = log_dir(config)?;
    std::fs::create_dir_all(&dir)
        .map_err(|e| LoggingError::create_dir_failed(dir.clone(), e.to_string()))?;

    let file_appender = tracing_appender::rolling::daily(&dir, format!("{}.log", config.app_name));
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(env_filter(config.level))
        .with(console)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(false),
        )
        .try_init()
        .map_err(|e| LoggingError::subscriber_init_failed(e.to_string()))?;

    // A second guard can only appear if init raced; dropping it is harmless.
    let _ = LOGGING_GUARD.set(LoggingGuard { _guard: guard });
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logging_config_default_values() {
        let config = LoggingConfig::default();
        assert!(config.enabled);
        assert_eq!(config.app_name, "agentic-workflow");
        assert!(config.log_dir.is_none());
        assert_eq!(config.level, LogLevel::Info);
    }

    #[test]
    fn logging_config_builder_pattern() {
        let config = LoggingConfig::new()
            .with_app_name("my-app")
            .with_log_dir("/tmp/logs")
            .with_level(LogLevel::Debug);

        assert_eq!(config.app_name, "my-app");
        assert_eq!(config.log_dir, Some(PathBuf::from("/tmp/logs")));
        assert_eq!(config.level, LogLevel::Debug);
    }

    #[test]
    fn logging_config_disabled() {
        assert!(!LoggingConfig::disabled().enabled);
    }

    #[test]
    fn log_level_parses_lowercase() {
        let config: LoggingConfig = toml::from_str("level = \"warn\"").unwrap();
        assert_eq!(config.level, LogLevel::Warn);
        assert!(config.enabled);
    }

    #[test]
    fn log_level_to_filter_mapping() {
        use tracing_subscriber::filter::LevelFilter;

        assert_eq!(LogLevel::Trace.to_filter(), LevelFilter::TRACE);
        assert_eq!(LogLevel::Debug.to_filter(), LevelFilter::DEBUG);
        assert_eq!(LogLevel::Info.to_filter(), LevelFilter::INFO);
        assert_eq!(LogLevel::Warn.to_filter(), LevelFilter::WARN);
        assert_eq!(LogLevel::Error.to_filter(), LevelFilter::ERROR);
    }

    #[test]
    fn custom_log_dir_is_used() {
        let config = LoggingConfig::new().with_log_dir("/var/log/aw");
        assert_eq!(log_dir(&config).unwrap(), PathBuf::from("/var/log/aw"));
    }

    #[test]
    fn default_log_dir_is_under_app_name() {
        if let Ok(dir) = log_dir(&LoggingConfig::default()) {
            assert!(dir.ends_with("agentic-workflow/logs"));
        }
    }

    #[test]
    fn logging_error_converts_to_workflow_error() {
        let error: WorkflowError = LoggingError::no_data_dir().into();
        assert!(error.to_string().contains("XDG_DATA_HOME"));
    }
}
