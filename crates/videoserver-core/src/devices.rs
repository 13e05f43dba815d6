//! Device table loading.
//!
//! The device table is an ini file with one section per capture device:
//!
//! ```ini
//! [Webcam1]
//! framerate = 30
//! resolution = 640x480
//! device = /dev/video0
//! bufferSize = 2
//! quality = 80
//! ```
//!
//! Section names are device names and keep their case. Option names are
//! matched case-insensitively.

use crate::error::{ConfigError, Result};
use crate::types::DeviceConfig;
use ini::{Ini, Properties};
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

/// The immutable table of configured devices, in file order.
#[derive(Debug, Clone, Default)]
pub struct DeviceTable {
    devices: Vec<DeviceConfig>,
}

impl DeviceTable {
    /// Builds a table from already constructed device configurations.
    pub fn new(devices: Vec<DeviceConfig>) -> Result<Self> {
        let mut seen = HashSet::new();
        for device in &devices {
            if !seen.insert(device.name.as_str()) {
                return Err(ConfigError::validation_failed(format!(
                    "duplicate device name: {}",
                    device.name
                ))
                .into());
            }
            device
                .validate()
                .map_err(|reason| ConfigError::invalid_device(&device.name, reason))?;
        }

        Ok(Self { devices })
    }

    /// Loads the device table from an ini file.
    pub fn from_ini_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::file_not_found(path.display().to_string()).into());
        }

        let ini = Ini::load_from_file(path).map_err(|e| ConfigError::LoadFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        Self::from_ini(&ini)
    }

    /// Loads the device table from ini text.
    pub fn from_ini_str(text: &str) -> Result<Self> {
        let ini = Ini::load_from_str(text).map_err(|e| ConfigError::InvalidFormat {
            reason: e.to_string(),
        })?;

        Self::from_ini(&ini)
    }

    fn from_ini(ini: &Ini) -> Result<Self> {
        let mut devices = Vec::new();

        for (section, properties) in ini.iter() {
            // Keys outside any section are not devices
            let Some(name) = section else { continue };

            let device = parse_device(name, properties)?;
            debug!(
                device = %device.name,
                framerate = device.framerate,
                resolution = %device.resolution,
                path = %device.device,
                buffer_size = device.buffer_size,
                quality = ?device.quality,
                "Loaded video device"
            );
            devices.push(device);
        }

        Self::new(devices)
    }

    /// Looks up a device by name.
    pub fn get(&self, name: &str) -> Option<&DeviceConfig> {
        self.devices.iter().find(|d| d.name == name)
    }

    /// Returns true if a device with this name is configured.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Device names in file order.
    pub fn names(&self) -> Vec<&str> {
        self.devices.iter().map(|d| d.name.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DeviceConfig> {
        self.devices.iter()
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

fn parse_device(name: &str, properties: &Properties) -> Result<DeviceConfig> {
    let device = DeviceConfig {
        name: name.to_string(),
        framerate: parse_positive(name, properties, "framerate")?,
        resolution: required(name, properties, "resolution")?.to_string(),
        device: required(name, properties, "device")?.to_string(),
        buffer_size: parse_positive(name, properties, "bufferSize")?,
        quality: lookup(properties, "quality").map(str::to_string),
    };

    Ok(device)
}

fn lookup<'a>(properties: &'a Properties, key: &str) -> Option<&'a str> {
    properties
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .map(|(_, v)| v.trim())
}

fn required<'a>(device: &str, properties: &'a Properties, key: &str) -> Result<&'a str> {
    lookup(properties, key)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ConfigError::missing_field(format!("{}.{}", device, key)).into())
}

fn parse_positive(device: &str, properties: &Properties, key: &str) -> Result<u32> {
    let raw = required(device, properties, key)?;
    match raw.parse::<u32>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(ConfigError::invalid_value(
            format!("{}.{}", device, key),
            format!("expected a positive integer, got '{}'", raw),
        )
        .into()),
    }
}
