//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for a service process.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Human-readable description logged at startup.
    pub info: String,

    /// Termination signals that end the run.
    pub signals: SignalConfig,

    /// Logging settings.
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            info: "service".to_string(),
            signals: SignalConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Which termination signals the listener subscribes to.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct SignalConfig {
    /// SIGINT / Ctrl-C.
    pub interrupt: bool,

    /// SIGTERM. Ignored on platforms without it.
    pub terminate: bool,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            interrupt: true,
            terminate: true,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable single-line output.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. "info" or "service_lifecycle=debug".
    pub filter: String,

    /// Output format.
    pub format: LogFormat,

    /// Colored output (text format only).
    pub ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            format: LogFormat::Text,
            ansi: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(config.signals.interrupt);
        assert!(config.signals.terminate);
        assert_eq!(config.logging.format, LogFormat::Text);
    }

    #[test]
    fn test_partial_override() {
        let config: AppConfig = toml::from_str(
            r#"
            info = "billing-worker"

            [signals]
            interrupt = false

            [logging]
            format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.info, "billing-worker");
        assert!(!config.signals.interrupt);
        assert!(config.signals.terminate);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.filter, "info");
    }

    #[test]
    fn test_unknown_format_rejected() {
        let result: Result<AppConfig, _> = toml::from_str("[logging]\nformat = \"xml\"");
        assert!(result.is_err());
    }
}
