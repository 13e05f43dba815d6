//! Core types for the video server.
//!
//! A [`DeviceConfig`] describes one capture device as read from the device
//! table. It is built once at load time and never mutated afterwards; runtime
//! state lives in the supervisor.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;

/// Configuration of a single video capture device.
///
/// # Examples
///
/// ```
/// use videoserver_core::types::DeviceConfig;
///
/// let device = DeviceConfig::builder()
///     .name("Webcam1")
///     .framerate(30)
///     .resolution("640x480")
///     .device("/dev/video0")
///     .buffer_size(2)
///     .build();
///
/// assert!(device.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Unique device name (the section name in the device table)
    pub name: String,

    /// Capture frame rate in frames per second
    pub framerate: u32,

    /// Capture resolution, e.g. "640x480"
    pub resolution: String,

    /// Capture device path, e.g. "/dev/video0"
    pub device: String,

    /// Number of frames buffered by the output stage
    pub buffer_size: u32,

    /// JPEG quality passed to the capture stage
    #[serde(default)]
    pub quality: Option<String>,
}

impl DeviceConfig {
    /// Creates a new builder for DeviceConfig.
    pub fn builder() -> DeviceConfigBuilder {
        DeviceConfigBuilder::default()
    }

    /// Validates the device configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.is_empty() {
            return Err("device name cannot be empty".to_string());
        }

        if self.framerate == 0 {
            return Err("framerate must be positive".to_string());
        }

        if self.buffer_size == 0 {
            return Err("bufferSize must be positive".to_string());
        }

        if self.device.is_empty() {
            return Err("device path cannot be empty".to_string());
        }

        Resolution::parse(&self.resolution)?;

        if let Some(ref quality) = self.quality {
            if quality.trim().is_empty() {
                return Err("quality cannot be empty when set".to_string());
            }
        }

        Ok(())
    }
}

/// Builder for DeviceConfig.
#[derive(Debug, Default)]
pub struct DeviceConfigBuilder {
    name: Option<String>,
    framerate: Option<u32>,
    resolution: Option<String>,
    device: Option<String>,
    buffer_size: Option<u32>,
    quality: Option<String>,
}

impl DeviceConfigBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn framerate(mut self, framerate: u32) -> Self {
        self.framerate = Some(framerate);
        self
    }

    pub fn resolution(mut self, resolution: impl Into<String>) -> Self {
        self.resolution = Some(resolution.into());
        self
    }

    pub fn device(mut self, device: impl Into<String>) -> Self {
        self.device = Some(device.into());
        self
    }

    pub fn buffer_size(mut self, buffer_size: u32) -> Self {
        self.buffer_size = Some(buffer_size);
        self
    }

    pub fn quality(mut self, quality: impl Into<String>) -> Self {
        self.quality = Some(quality.into());
        self
    }

    /// Builds the DeviceConfig, falling back to the stock webcam defaults
    /// for anything not set.
    pub fn build(self) -> DeviceConfig {
        DeviceConfig {
            name: self.name.unwrap_or_default(),
            framerate: self.framerate.unwrap_or(30),
            resolution: self.resolution.unwrap_or_else(|| "640x480".to_string()),
            device: self.device.unwrap_or_else(|| "/dev/video0".to_string()),
            buffer_size: self.buffer_size.unwrap_or(2),
            quality: self.quality,
        }
    }
}

/// A parsed `<width>x<height>` capture resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    /// Parses a resolution string such as "640x480".
    ///
    /// The string is handed to the streamer verbatim, so whitespace is
    /// rejected rather than trimmed.
    pub fn parse(value: &str) -> Result<Self, String> {
        if value.chars().any(char::is_whitespace) {
            return Err(format!("invalid resolution '{}', whitespace not allowed", value));
        }

        let (width, height) = value
            .split_once('x')
            .ok_or_else(|| format!("invalid resolution '{}', expected <width>x<height>", value))?;

        let width: u32 = width
            .parse()
            .map_err(|_| format!("invalid resolution width in '{}'", value))?;
        let height: u32 = height
            .parse()
            .map_err(|_| format!("invalid resolution height in '{}'", value))?;

        if width == 0 || height == 0 {
            return Err(format!("resolution '{}' must have positive dimensions", value));
        }

        Ok(Self { width, height })
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A network interface together with the IPv4 address used to advertise on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkInterface {
    /// Interface name, e.g. "eth0"
    pub name: String,

    /// IPv4 address of the interface
    pub ip: Ipv4Addr,
}

impl NetworkInterface {
    pub fn new(name: impl Into<String>, ip: Ipv4Addr) -> Self {
        Self {
            name: name.into(),
            ip,
        }
    }

    /// The loopback interface, used when remote communication is disabled.
    pub fn loopback() -> Self {
        Self::new("lo", Ipv4Addr::LOCALHOST)
    }
}

impl fmt::Display for NetworkInterface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.ip)
    }
}
