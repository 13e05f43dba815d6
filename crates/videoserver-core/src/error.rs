//! Error types for the video server.
//!
//! Configuration and interface-resolution failures are fatal at startup; the
//! binary reports them and exits with a nonzero status. All errors are
//! serializable so they can be emitted as structured log fields.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using VideoServerError as the error type.
pub type Result<T> = std::result::Result<T, VideoServerError>;

/// Top-level error type for configuration and startup operations.
#[derive(Debug, Error, Serialize, Deserialize)]
#[serde(tag = "type", content = "details")]
pub enum VideoServerError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Network interface resolution errors
    #[error("Interface error: {0}")]
    Interface(#[from] InterfaceError),
}

/// Errors related to configuration.
///
/// These errors occur when loading, parsing, or validating the application
/// settings, the device table or the master configuration file.
#[derive(Debug, Error, Serialize, Deserialize)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {reason}")]
    LoadFailed { path: String, reason: String },

    /// Invalid configuration format
    #[error("Invalid configuration format: {reason}")]
    InvalidFormat { reason: String },

    /// Missing required configuration field
    #[error("Missing required configuration field: {field}")]
    MissingField { field: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    /// Configuration validation failed
    #[error("Configuration validation failed: {reason}")]
    ValidationFailed { reason: String },

    /// Invalid device section in the device table
    #[error("Invalid configuration for device '{device}': {reason}")]
    InvalidDeviceConfig { device: String, reason: String },

    /// Environment variable error
    #[error("Environment variable error: {details}")]
    EnvironmentVariableError { details: String },
}

impl ConfigError {
    /// Creates a file not found error.
    pub fn file_not_found(path: impl Into<String>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Creates a missing field error.
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Creates an invalid value error.
    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Creates a validation failed error.
    pub fn validation_failed(reason: impl Into<String>) -> Self {
        Self::ValidationFailed {
            reason: reason.into(),
        }
    }

    /// Creates an invalid device configuration error.
    pub fn invalid_device(device: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidDeviceConfig {
            device: device.into(),
            reason: reason.into(),
        }
    }

    /// Creates a missing environment variable error.
    pub fn missing_env(name: &str) -> Self {
        Self::EnvironmentVariableError {
            details: format!("no {} environment variable set", name),
        }
    }
}

/// Errors raised while picking the network interface to advertise on.
#[derive(Debug, Error, Serialize, Deserialize)]
pub enum InterfaceError {
    /// None of the preferred prefixes matched an interface with an IPv4 address
    #[error("failed to determine preferred interface (preference = {preferences:?})")]
    NoMatch { preferences: Vec<String> },

    /// The operating system refused to enumerate interfaces
    #[error("failed to enumerate network interfaces: {reason}")]
    EnumerationFailed { reason: String },
}
