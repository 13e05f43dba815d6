//! Error types for the device supervisor

use thiserror::Error;
use videoserver_discovery::DiscoveryError;

/// Result type alias for supervisor operations
pub type Result<T> = std::result::Result<T, SupervisorError>;

/// Errors returned by `start`/`stop` and the process seam
#[derive(Debug, Error)]
pub enum SupervisorError {
    /// The device name is not in the device table
    #[error("Unknown video device: {name}")]
    UnknownDevice { name: String },

    /// No ephemeral port could be obtained
    #[error("Failed to allocate a port: {0}")]
    PortAllocation(#[source] std::io::Error),

    /// The streaming program could not be started
    #[error("Failed to launch {program} for device '{device}': {source}")]
    Launch {
        device: String,
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The streaming program could not be signalled
    #[error("Failed to terminate stream process {pid}: {reason}")]
    Terminate { pid: u32, reason: String },

    /// Discovery backend failure
    #[error("Discovery error: {0}")]
    Discovery(#[from] DiscoveryError),
}

impl SupervisorError {
    /// Creates an unknown device error.
    pub fn unknown_device(name: impl Into<String>) -> Self {
        Self::UnknownDevice { name: name.into() }
    }
}
