//! The publishing capability used by the supervisor

use crate::error::Result;
use crate::mdns::MdnsPublisher;
use crate::record::{Registration, ServiceRecord};
use std::net::Ipv4Addr;
use tracing::{debug, info};
use videoserver_core::discovery_config::{DiscoveryBackend, DiscoveryConfig};

/// Announces and withdraws service records.
///
/// Implementations wrap one concrete discovery mechanism. The supervisor only
/// talks to this trait, so backends are swapped by configuration.
pub trait Publisher: Send {
    /// Announces a record and returns the handle needed to withdraw it.
    fn publish(&mut self, record: &ServiceRecord) -> Result<Registration>;

    /// Withdraws a previously published record.
    fn unpublish(&mut self, registration: Registration) -> Result<()>;

    /// Services pending backend events. Called on every supervisor tick.
    fn poll_events(&mut self) {}

    /// Releases backend resources. Records still published are withdrawn.
    fn shutdown(&mut self) -> Result<()> {
        Ok(())
    }

    /// Short backend name for logs
    fn name(&self) -> &'static str;
}

impl<P: Publisher + ?Sized> Publisher for Box<P> {
    fn publish(&mut self, record: &ServiceRecord) -> Result<Registration> {
        (**self).publish(record)
    }

    fn unpublish(&mut self, registration: Registration) -> Result<()> {
        (**self).unpublish(registration)
    }

    fn poll_events(&mut self) {
        (**self).poll_events()
    }

    fn shutdown(&mut self) -> Result<()> {
        (**self).shutdown()
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// Publisher used when discovery is turned off.
///
/// Hands out registrations without any network traffic, so streams still run
/// and can be reached by their URI.
#[derive(Debug, Default)]
pub struct DisabledPublisher {
    domain: String,
}

impl DisabledPublisher {
    pub fn new(config: &DiscoveryConfig) -> Self {
        Self {
            domain: config.domain.clone(),
        }
    }
}

impl Publisher for DisabledPublisher {
    fn publish(&mut self, record: &ServiceRecord) -> Result<Registration> {
        debug!(service = %record.name, "Discovery disabled, not announcing");
        Ok(Registration {
            name: record.name.clone(),
            fullname: format!("{}.{}.{}", record.name, record.service_type, self.domain),
            instance: record.instance().unwrap_or_default().to_string(),
        })
    }

    fn unpublish(&mut self, registration: Registration) -> Result<()> {
        debug!(service = %registration.name, "Discovery disabled, nothing to withdraw");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "disabled"
    }
}

/// Builds the publisher selected in the configuration.
///
/// `ip` is the address records are announced with.
pub fn build_publisher(config: &DiscoveryConfig, ip: Ipv4Addr) -> Result<Box<dyn Publisher>> {
    info!(
        backend = ?config.backend,
        description = config.backend.description(),
        "Selecting discovery backend"
    );

    match config.backend {
        DiscoveryBackend::Mdns => Ok(Box::new(MdnsPublisher::new(config.clone(), ip)?)),
        DiscoveryBackend::Disabled => Ok(Box::new(DisabledPublisher::new(config))),
    }
}
