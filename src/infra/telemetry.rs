//! Logging setup.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

#[derive(Debug, Error)]
#[error("failed to install tracing subscriber: {0}")]
pub struct TelemetryError(String);

/// Minimum level logged when `RUST_LOG` is unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    #[default]
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Raises the level by one step per `-v`.
    pub fn raised_by(self, verbosity: u8) -> Self {
        let levels = [
            LogLevel::Error,
            LogLevel::Warn,
            LogLevel::Info,
            LogLevel::Debug,
            LogLevel::Trace,
        ];
        let current = levels.iter().position(|l| *l == self).unwrap_or(1);
        let raised = (current + verbosity as usize).min(levels.len() - 1);
        levels[raised]
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

/// The `[logging]` config section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: LogLevel,
    pub format: LogFormat,
}

/// Installs the global subscriber, writing to stderr.
///
/// `RUST_LOG` overrides the configured level when set.
pub fn init(logging: &LoggingSettings, verbosity: u8) -> Result<(), TelemetryError> {
    let level: LevelFilter = logging.level.raised_by(verbosity).into();
    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_writer(std::io::stderr)
            .with_target(false)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|err| TelemetryError(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn verbosity_raises_level() {
        assert_eq!(LogLevel::Warn.raised_by(0), LogLevel::Warn);
        assert_eq!(LogLevel::Warn.raised_by(1), LogLevel::Info);
        assert_eq!(LogLevel::Warn.raised_by(2), LogLevel::Debug);
        assert_eq!(LogLevel::Info.raised_by(9), LogLevel::Trace);
    }

    #[test]
    fn settings_parse_lowercase() {
        let settings: LoggingSettings =
            toml::from_str("level = \"debug\"\nformat = \"json\"").unwrap();
        assert_eq!(settings.level, LogLevel::Debug);
        assert_eq!(settings.format, LogFormat::Json);
    }

    #[test]
    fn settings_default_when_missing() {
        let settings: LoggingSettings = toml::from_str("").unwrap();
        assert_eq!(settings, LoggingSettings::default());
    }
}
