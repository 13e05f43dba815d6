//! Startup sequence of the video server.
//!
//! The installation UUID is resolved before anything else; without it the
//! server refuses to start and never touches the device table.

use std::path::PathBuf;
use tracing::{debug, info};
use videoserver_core::error::{InterfaceError, Result};
use videoserver_core::interfaces::choose_interface;
use videoserver_core::machinekit::{resolve_installation_uuid, MasterConfig};
use videoserver_core::{AppConfig, DeviceTable, NetworkInterface};

/// Values taken from the process environment.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    /// `MKUUID`, or `--mkuuid`
    pub mkuuid: Option<String>,

    /// `MACHINEKIT_INI`, or `--machinekit-ini`
    pub machinekit_ini: Option<PathBuf>,
}

/// Everything the supervisor needs, resolved in startup order.
#[derive(Debug)]
pub struct Startup {
    pub installation_uuid: String,
    pub interface: NetworkInterface,
    pub devices: DeviceTable,
}

/// Resolves the installation UUID, the interface and the device table.
///
/// `list_interfaces` is only called when the master configuration does not
/// pin the server to loopback.
pub fn prepare<F>(config: &AppConfig, env: &Environment, list_interfaces: F) -> Result<Startup>
where
    F: FnOnce() -> Result<Vec<NetworkInterface>>,
{
    let master = env
        .machinekit_ini
        .as_ref()
        .map(MasterConfig::from_file)
        .transpose()?;

    let installation_uuid = resolve_installation_uuid(env.mkuuid.as_deref(), master.as_ref())?;
    debug!(uuid = %installation_uuid, "Resolved installation UUID");

    let interface = select_interface(config, master.as_ref(), list_interfaces)?;

    let devices = DeviceTable::from_ini_file(&config.devices.file)?;
    info!(
        file = %config.devices.file.display(),
        devices = ?devices.names(),
        "Loaded device table"
    );

    Ok(Startup {
        installation_uuid,
        interface,
        devices,
    })
}

/// Picks the interface streams are served and advertised on.
///
/// A master configuration with `REMOTE=0` pins the server to loopback. Its
/// `INTERFACES` list, when not empty, replaces the configured preferences.
pub fn select_interface<F>(
    config: &AppConfig,
    master: Option<&MasterConfig>,
    list_interfaces: F,
) -> Result<NetworkInterface>
where
    F: FnOnce() -> Result<Vec<NetworkInterface>>,
{
    if let Some(master) = master {
        if !master.remote {
            info!("Remote access disabled, serving video on loopback");
            return Ok(NetworkInterface::loopback());
        }
    }

    let preferences = match master {
        Some(master) if !master.interfaces.is_empty() => &master.interfaces,
        _ => &config.network.interfaces,
    };

    let interfaces = list_interfaces()?;
    let interface = choose_interface(preferences, &interfaces).ok_or_else(|| {
        InterfaceError::NoMatch {
            preferences: preferences.clone(),
        }
    })?;

    info!(interface = %interface, "Selected network interface");
    Ok(interface)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn interfaces() -> Result<Vec<NetworkInterface>> {
        Ok(vec![
            NetworkInterface::loopback(),
            NetworkInterface::new("eth0", Ipv4Addr::new(10, 0, 0, 5)),
            NetworkInterface::new("wlan0", Ipv4Addr::new(192, 168, 1, 20)),
        ])
    }

    fn master(remote: bool, interfaces: &[&str]) -> MasterConfig {
        MasterConfig {
            mkuuid: None,
            remote,
            interfaces: interfaces.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_configured_preferences() {
        let interface = select_interface(&AppConfig::default(), None, interfaces).unwrap();
        assert_eq!(interface.name, "wlan0");
    }

    #[test]
    fn test_master_interfaces_take_precedence() {
        let master = master(true, &["eth", "wlan"]);
        let interface =
            select_interface(&AppConfig::default(), Some(&master), interfaces).unwrap();
        assert_eq!(interface.name, "eth0");
    }

    #[test]
    fn test_empty_master_list_falls_back() {
        let master = master(true, &[]);
        let interface =
            select_interface(&AppConfig::default(), Some(&master), interfaces).unwrap();
        assert_eq!(interface.name, "wlan0");
    }

    #[test]
    fn test_local_only_uses_loopback() {
        let master = master(false, &["eth"]);
        let interface = select_interface(&AppConfig::default(), Some(&master), || {
            panic!("interfaces must not be enumerated")
        })
        .unwrap();
        assert_eq!(interface, NetworkInterface::loopback());
    }

    #[test]
    fn test_no_matching_interface() {
        let master = master(true, &["usb"]);
        let err = select_interface(&AppConfig::default(), Some(&master), interfaces).unwrap_err();
        assert!(err.to_string().contains("usb"));
    }
}
