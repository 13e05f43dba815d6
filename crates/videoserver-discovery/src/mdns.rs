//! Multicast DNS publisher built on `mdns-sd`

use crate::error::{DiscoveryError, Result};
use crate::publisher::Publisher;
use crate::record::{Registration, ServiceRecord};
use mdns_sd::{DaemonEvent, Receiver, ServiceDaemon, ServiceInfo};
use std::collections::{HashMap, HashSet};
use std::net::{IpAddr, Ipv4Addr};
use tracing::{debug, error, info, warn};
use videoserver_core::discovery_config::DiscoveryConfig;

/// Publishes records through an in-process mDNS responder.
///
/// The responder runs on its own thread; `poll_events` only drains its
/// monitor channel so announcements and errors show up in the logs.
pub struct MdnsPublisher {
    /// Configuration
    config: DiscoveryConfig,

    /// mDNS service daemon
    mdns: ServiceDaemon,

    /// Daemon event monitor
    monitor: Option<Receiver<DaemonEvent>>,

    /// Host name records point at, e.g. "beaglebone.local."
    host_name: String,

    /// Address records are announced with
    ip: Ipv4Addr,

    /// Full names of records currently registered
    registered: HashSet<String>,
}

impl MdnsPublisher {
    /// Creates a publisher and starts the mDNS daemon.
    pub fn new(config: DiscoveryConfig, ip: Ipv4Addr) -> Result<Self> {
        config.validate().map_err(DiscoveryError::InvalidRecord)?;

        let mdns = ServiceDaemon::new().map_err(|e| {
            DiscoveryError::DaemonInitFailed(format!("Failed to create mDNS daemon: {}", e))
        })?;

        let monitor = match mdns.monitor() {
            Ok(receiver) => Some(receiver),
            Err(e) => {
                warn!(error = %e, "mDNS daemon monitor unavailable");
                None
            }
        };

        let host = match config.hostname {
            Some(ref name) => name.clone(),
            None => hostname::get()
                .map_err(|e| {
                    DiscoveryError::DaemonInitFailed(format!("Failed to read host name: {}", e))
                })?
                .to_string_lossy()
                .into_owned(),
        };
        let host_name = qualify_host_name(&host, &config.domain);

        info!(host = %host_name, ip = %ip, "mDNS publisher created");

        Ok(Self {
            config,
            mdns,
            monitor,
            host_name,
            ip,
            registered: HashSet::new(),
        })
    }
}

impl Publisher for MdnsPublisher {
    fn publish(&mut self, record: &ServiceRecord) -> Result<Registration> {
        let info = service_info(record, &self.config.domain, &self.host_name, self.ip)?;
        let fullname = info.get_fullname().to_string();

        debug!(
            service = %fullname,
            port = record.port,
            properties = ?record.properties,
            "Registering service"
        );

        self.mdns
            .register(info)
            .map_err(|e| DiscoveryError::RegisterFailed {
                service_name: record.name.clone(),
                reason: e.to_string(),
            })?;

        self.registered.insert(fullname.clone());
        info!(service = %fullname, "Service registered");

        Ok(Registration {
            name: record.name.clone(),
            fullname,
            instance: record.instance().unwrap_or_default().to_string(),
        })
    }

    fn unpublish(&mut self, registration: Registration) -> Result<()> {
        self.registered.remove(&registration.fullname);

        // The returned channel reports when the goodbye packets went out
        let _status = self.mdns.unregister(&registration.fullname).map_err(|e| {
            DiscoveryError::UnregisterFailed {
                service_name: registration.name.clone(),
                reason: e.to_string(),
            }
        })?;

        info!(service = %registration.fullname, "Service unregistered");
        Ok(())
    }

    fn poll_events(&mut self) {
        let Some(ref monitor) = self.monitor else {
            return;
        };

        while let Ok(event) = monitor.try_recv() {
            match event {
                DaemonEvent::Announce(service, addrs) => {
                    debug!(service = %service, addrs = %addrs, "Service announced");
                }
                DaemonEvent::Error(e) => {
                    error!(error = %e, "mDNS daemon error");
                }
                other => {
                    debug!(event = ?other, "mDNS daemon event");
                }
            }
        }
    }

    fn shutdown(&mut self) -> Result<()> {
        for fullname in self.registered.drain() {
            if let Err(e) = self.mdns.unregister(&fullname) {
                warn!(service = %fullname, error = %e, "Failed to unregister on shutdown");
            }
        }

        self.mdns.shutdown().map_err(|e| {
            DiscoveryError::Internal(format!("Failed to shutdown mDNS daemon: {}", e))
        })?;

        info!("mDNS publisher stopped");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "mdns"
    }
}

/// Converts a record into mdns-sd's ServiceInfo.
///
/// Dots in the instance name are escaped by mdns-sd, so
/// `"Webcam1 on 10.0.0.5"` stays a single DNS label.
fn service_info(
    record: &ServiceRecord,
    domain: &str,
    host_name: &str,
    ip: Ipv4Addr,
) -> Result<ServiceInfo> {
    let properties: HashMap<String, String> = record.properties.iter().cloned().collect();

    ServiceInfo::new(
        &record.registration_type(domain),
        &record.name,
        host_name,
        IpAddr::V4(ip),
        record.port,
        properties,
    )
    .map_err(|e| DiscoveryError::InvalidRecord(format!("{}: {}", record.name, e)))
}

/// Appends the mDNS domain to a bare host name.
fn qualify_host_name(host: &str, domain: &str) -> String {
    if host.ends_with(domain) {
        host.to_string()
    } else {
        format!("{}.{}", host.trim_end_matches('.'), domain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualify_host_name() {
        assert_eq!(qualify_host_name("beaglebone", "local."), "beaglebone.local.");
        assert_eq!(
            qualify_host_name("beaglebone.local.", "local."),
            "beaglebone.local."
        );
        assert_eq!(qualify_host_name("beaglebone.", "local."), "beaglebone.local.");
    }

    #[test]
    fn test_instance_name_is_one_label() {
        let ip = Ipv4Addr::new(10, 0, 0, 5);
        let record = ServiceRecord::video("Webcam1", ip, 5600, "tcp://10.0.0.5:5600", "mkuuid");

        let info = service_info(&record, "local.", "beaglebone.local.", ip).unwrap();

        assert_eq!(
            info.get_fullname(),
            "Webcam1 on 10\\.0\\.0\\.5._machinekit._tcp.local."
        );
        assert_eq!(info.get_type(), "_machinekit._tcp.local.");
        assert_eq!(
            info.get_subtype().as_deref(),
            Some("_video._sub._machinekit._tcp.local.")
        );
        assert_eq!(info.get_port(), 5600);
        assert_eq!(info.get_property_val_str("dsn"), Some("tcp://10.0.0.5:5600"));
        assert_eq!(info.get_property_val_str("service"), Some("video"));
    }

    #[test]
    fn test_invalid_config() {
        let config = DiscoveryConfig {
            domain: String::new(),
            ..Default::default()
        };
        assert!(MdnsPublisher::new(config, Ipv4Addr::LOCALHOST).is_err());
    }
}
