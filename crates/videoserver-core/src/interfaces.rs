//! Network interface selection.
//!
//! Streams are advertised on a single IPv4 address. The interface is picked
//! from an ordered list of name prefixes, e.g. `["wlan", "eth", "usb"]`.

use crate::error::{InterfaceError, Result};
use crate::types::NetworkInterface;
use tracing::debug;

/// Lists the IPv4 addresses of all system interfaces, in enumeration order.
///
/// An interface with several IPv4 addresses appears once per address.
pub fn list_interfaces() -> Result<Vec<NetworkInterface>> {
    let addrs = nix::ifaddrs::getifaddrs().map_err(|e| InterfaceError::EnumerationFailed {
        reason: e.to_string(),
    })?;

    let mut interfaces = Vec::new();
    for ifaddr in addrs {
        let Some(address) = ifaddr.address else {
            continue;
        };

        if let Some(sockaddr_in) = address.as_sockaddr_in() {
            interfaces.push(NetworkInterface::new(
                ifaddr.interface_name.clone(),
                sockaddr_in.ip(),
            ));
        }
    }

    debug!(count = interfaces.len(), "Enumerated network interfaces");
    Ok(interfaces)
}

/// Picks the first interface matching the preference list.
///
/// Preferences are tried in order; within one preference, interfaces are
/// scanned in enumeration order and the first name starting with the prefix
/// wins. The first IPv4 address of that interface is returned.
pub fn choose_interface<S: AsRef<str>>(
    preferences: &[S],
    interfaces: &[NetworkInterface],
) -> Option<NetworkInterface> {
    preferences.iter().find_map(|prefix| {
        interfaces
            .iter()
            .find(|iface| iface.name.starts_with(prefix.as_ref()))
            .cloned()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn iface(name: &str, ip: [u8; 4]) -> NetworkInterface {
        NetworkInterface::new(name, Ipv4Addr::from(ip))
    }

    #[test]
    fn test_choose_by_prefix() {
        let interfaces = vec![iface("lo", [127, 0, 0, 1]), iface("eth0", [10, 0, 0, 5])];

        let chosen = choose_interface(&["eth", "usb"], &interfaces).unwrap();
        assert_eq!(chosen.name, "eth0");
        assert_eq!(chosen.ip, Ipv4Addr::new(10, 0, 0, 5));
    }

    #[test]
    fn test_preference_order_wins_over_enumeration_order() {
        let interfaces = vec![
            iface("eth0", [10, 0, 0, 5]),
            iface("wlan0", [192, 168, 1, 20]),
        ];

        let chosen = choose_interface(&["wlan", "eth"], &interfaces).unwrap();
        assert_eq!(chosen.name, "wlan0");
    }

    #[test]
    fn test_first_address_of_interface() {
        let interfaces = vec![
            iface("usb0", [192, 168, 7, 2]),
            iface("usb0", [192, 168, 8, 2]),
        ];

        let chosen = choose_interface(&["usb"], &interfaces).unwrap();
        assert_eq!(chosen.ip, Ipv4Addr::new(192, 168, 7, 2));
    }

    #[test]
    fn test_exact_name_preference() {
        let interfaces = vec![iface("eth0", [10, 0, 0, 5]), iface("eth1", [10, 0, 1, 5])];

        let chosen = choose_interface(&["eth1"], &interfaces).unwrap();
        assert_eq!(chosen.name, "eth1");
    }

    #[test]
    fn test_no_match() {
        let interfaces = vec![iface("lo", [127, 0, 0, 1])];
        assert!(choose_interface(&["eth", "usb"], &interfaces).is_none());

        let empty: [&str; 0] = [];
        assert!(choose_interface(&empty, &interfaces).is_none());
    }
}
