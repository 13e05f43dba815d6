//! Master configuration shared by all services of an installation.
//!
//! The file is named by the `MACHINEKIT_INI` environment variable and holds a
//! `[MACHINEKIT]` section:
//!
//! ```ini
//! [MACHINEKIT]
//! MKUUID = a42c8c6b-4025-4f83-ba28-dad21114744a
//! REMOTE = 1
//! INTERFACES = eth wlan usb
//! ```

use crate::error::{ConfigError, Result};
use ini::Ini;
use std::path::Path;

/// Environment variable naming the master configuration file.
pub const MACHINEKIT_INI_ENV: &str = "MACHINEKIT_INI";

/// Environment variable carrying the installation UUID.
pub const MKUUID_ENV: &str = "MKUUID";

const SECTION: &str = "MACHINEKIT";

/// Values read from the `[MACHINEKIT]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MasterConfig {
    /// Installation UUID, if the file defines one
    pub mkuuid: Option<String>,

    /// Whether services listen on a routable interface instead of loopback
    pub remote: bool,

    /// Ordered interface name prefixes
    pub interfaces: Vec<String>,
}

impl MasterConfig {
    /// Loads the master configuration from a file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
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

    /// Loads the master configuration from ini text.
    pub fn from_ini_str(text: &str) -> Result<Self> {
        let ini = Ini::load_from_str(text).map_err(|e| ConfigError::InvalidFormat {
            reason: e.to_string(),
        })?;

        Self::from_ini(&ini)
    }

    fn from_ini(ini: &Ini) -> Result<Self> {
        let section = ini
            .section(Some(SECTION))
            .ok_or_else(|| ConfigError::missing_field(format!("[{}]", SECTION)))?;

        let get = |key: &str| {
            section
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(key))
                .map(|(_, v)| v.trim())
        };

        let remote = match get("REMOTE") {
            Some(raw) => raw.parse::<i64>().map(|v| v != 0).map_err(|_| {
                ConfigError::invalid_value(
                    format!("{}.REMOTE", SECTION),
                    format!("expected an integer, got '{}'", raw),
                )
            })?,
            None => return Err(ConfigError::missing_field(format!("{}.REMOTE", SECTION)).into()),
        };

        let interfaces = get("INTERFACES")
            .map(|raw| raw.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default();

        Ok(Self {
            mkuuid: get("MKUUID").filter(|v| !v.is_empty()).map(str::to_string),
            remote,
            interfaces,
        })
    }
}

/// Resolves the installation UUID.
///
/// An explicit value (command line or `MKUUID` environment variable) wins over
/// the master configuration. Having neither is a fatal configuration error.
pub fn resolve_installation_uuid(
    explicit: Option<&str>,
    master: Option<&MasterConfig>,
) -> Result<String> {
    explicit
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .or_else(|| master.and_then(|m| m.mkuuid.clone()))
        .ok_or_else(|| ConfigError::missing_env(MKUUID_ENV).into())
}
