//! Error types for the job board configuration

use thiserror::Error;

/// Result type for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A source could not be parsed or did not match the settings shape
    #[error("Failed to parse configuration: {source}")]
    ParseError {
        #[source]
        source: Box<figment::Error>,
    },

    /// Parsed values are out of range
    #[error("Invalid configuration value for key '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

impl ConfigError {
    pub fn invalid_value(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            message: message.into(),
        }
    }
}

impl From<figment::Error> for ConfigError {
    fn from(error: figment::Error) -> Self {
        ConfigError::ParseError {
            source: Box::new(error),
        }
    }
}
