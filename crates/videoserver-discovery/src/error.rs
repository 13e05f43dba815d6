//! Error types for discovery publishing

use thiserror::Error;

/// Result type alias for discovery operations
pub type Result<T> = std::result::Result<T, DiscoveryError>;

/// Errors that can occur while publishing or withdrawing records
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// mDNS service daemon failed to initialize
    #[error("Failed to initialize mDNS daemon: {0}")]
    DaemonInitFailed(String),

    /// Failed to register/announce a service
    #[error("Failed to register service '{service_name}': {reason}")]
    RegisterFailed {
        service_name: String,
        reason: String,
    },

    /// Failed to withdraw a registered service
    #[error("Failed to unregister service '{service_name}': {reason}")]
    UnregisterFailed {
        service_name: String,
        reason: String,
    },

    /// The record cannot be expressed as a DNS-SD registration
    #[error("Invalid service record: {0}")]
    InvalidRecord(String),

    /// Internal error
    #[error("Internal discovery error: {0}")]
    Internal(String),
}
