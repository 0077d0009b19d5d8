//! Diagnostic log setup for hosts that do not configure `tracing` themselves.
//!
//! Gateway diagnostics ("channel not found", "validator not found", "sanity
//! check failed") are emitted at `warn`; channel creation and delivery at
//! `debug`/`trace`. Filters use `EnvFilter` directive syntax, for example
//! `warn,remotegate_gateway=debug`.

use std::str::FromStr;

use tracing_subscriber::EnvFilter;

/// Output encoding for the stderr subscriber.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err(LoggingError::UnknownFormat(s.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("unknown log format: {0}")]
    UnknownFormat(String),

    #[error("invalid log filter {directives:?}: {message}")]
    InvalidFilter { directives: String, message: String },

    /// Another global subscriber was installed first; it stays in place.
    #[error("global subscriber already installed: {0}")]
    AlreadyInstalled(String),
}

/// Subscriber settings for [`init_logging`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogConfig {
    pub format: LogFormat,
    /// `EnvFilter` directives.
    pub filter: String,
    /// Include the emitting crate in each line.
    pub with_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Text,
            filter: "warn".to_string(),
            with_target: false,
        }
    }
}

impl LogConfig {
    pub fn new(format: LogFormat, filter: impl Into<String>) -> Self {
        Self {
            format,
            filter: filter.into(),
            ..Self::default()
        }
    }

    pub fn with_target(mut self, with_target: bool) -> Self {
        self.with_target = with_target;
        self
    }

    /// Parse the filter directives.
    pub fn env_filter(&self) -> Result<EnvFilter, LoggingError> {
        EnvFilter::try_new(&self.filter).map_err(|err| LoggingError::InvalidFilter {
            directives: self.filter.clone(),
            message: err.to_string(),
        })
    }
}

/// Install a global stderr subscriber built from `config`.
///
/// Fails with [`LoggingError::AlreadyInstalled`] when the host set its own
/// subscriber first.
pub fn init_logging(config: &LogConfig) -> Result<(), LoggingError> {
    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(config.env_filter()?)
        .with_ansi(false)
        .with_target(config.with_target);

    let installed = match config.format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|err| LoggingError::AlreadyInstalled(err.to_string()))?;

    tracing::debug!(filter = %config.filter, format = ?config.format, "logging initialized");
    Ok(())
}
