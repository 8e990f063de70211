//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - At least one termination signal must be enabled
//! - The log filter must be a valid `EnvFilter` directive
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::config::schema::AppConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Without any signal the application could never shut down.
    #[error("no termination signal enabled")]
    NoSignals,

    #[error("log filter is empty")]
    EmptyLogFilter,

    #[error("invalid log filter '{filter}': {reason}")]
    InvalidLogFilter { filter: String, reason: String },
}

/// Check a parsed configuration.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if !config.signals.interrupt && !config.signals.terminate {
        errors.push(ValidationError::NoSignals);
    }

    let filter = config.logging.filter.trim();
    if filter.is_empty() {
        errors.push(ValidationError::EmptyLogFilter);
    } else if let Err(e) = EnvFilter::try_new(filter) {
        errors.push(ValidationError::InvalidLogFilter {
            filter: filter.to_string(),
            reason: e.to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
