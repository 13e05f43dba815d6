//! Service discovery publishing for video streams
//!
//! Each running video device is announced on the local network so clients
//! can find its stream without prior configuration:
//! - Service type `_machinekit._tcp` with the `_video` subtype
//! - Instance name `"<device> on <ip>"`
//! - TXT record with `dsn`, `uuid`, `service=video` and a fresh `instance`
//!
//! # Architecture
//!
//! The [`Publisher`] trait is the only thing the supervisor depends on.
//! [`MdnsPublisher`] implements it with the `mdns-sd` responder (RFC 6762 /
//! RFC 6763); [`DisabledPublisher`] runs streams without announcing them.
//! [`build_publisher`] picks one from the configuration.
//!
//! # Example
//!
//! ```no_run
//! use std::net::Ipv4Addr;
//! use videoserver_core::discovery_config::DiscoveryConfig;
//! use videoserver_discovery::{build_publisher, ServiceRecord};
//!
//! fn main() -> anyhow::Result<()> {
//!     let ip = Ipv4Addr::new(10, 0, 0, 5);
//!     let mut publisher = build_publisher(&DiscoveryConfig::default(), ip)?;
//!
//!     let record = ServiceRecord::video("Webcam1", ip, 5600, "tcp://10.0.0.5:5600", "mkuuid");
//!     let registration = publisher.publish(&record)?;
//!     publisher.unpublish(registration)?;
//!
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod mdns;
pub mod publisher;
pub mod record;

pub use error::{DiscoveryError, Result};
pub use mdns::MdnsPublisher;
pub use publisher::{build_publisher, DisabledPublisher, Publisher};
pub use record::{discovery_name, Registration, ServiceRecord};
