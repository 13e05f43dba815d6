//! # videoserver core
//!
//! Core types, error handling and configuration for the machinekit video
//! server.
//!
//! - **Types**: `DeviceConfig` for each capture device and `NetworkInterface`
//!   for the address streams are advertised on.
//! - **Errors**: `thiserror` enums for configuration and interface-resolution
//!   failures, both fatal at startup.
//! - **Configuration**: the ini device table, the machinekit master ini and
//!   the optional YAML application settings with environment overrides.
//!
//! ## Example
//!
//! ```
//! use videoserver_core::devices::DeviceTable;
//!
//! let table = DeviceTable::from_ini_str(
//!     "[Webcam1]\nframerate = 30\nresolution = 640x480\ndevice = /dev/video0\nbufferSize = 2\n",
//! )
//! .unwrap();
//!
//! assert!(table.contains("Webcam1"));
//! ```

pub mod config;
pub mod devices;
pub mod discovery_config;
pub mod error;
pub mod interfaces;
pub mod machinekit;
pub mod types;

// Re-export commonly used types for convenience
pub use config::{AppConfig, PublishFailurePolicy};
pub use devices::DeviceTable;
pub use error::{ConfigError, InterfaceError, Result, VideoServerError};
pub use types::{DeviceConfig, NetworkInterface};
