//! Discovery records for video streams

use std::fmt;
use std::net::Ipv4Addr;
use uuid::Uuid;
use videoserver_core::discovery_config::{MACHINEKIT_SERVICE_TYPE, VIDEO_SUBTYPE};

/// TXT key holding the advertised data source URI
pub const TXT_DSN: &str = "dsn";
/// TXT key holding the installation UUID
pub const TXT_UUID: &str = "uuid";
/// TXT key holding the service category
pub const TXT_SERVICE: &str = "service";
/// TXT key holding the per-publish instance UUID
pub const TXT_INSTANCE: &str = "instance";

/// Service category of video streams
pub const VIDEO_SERVICE: &str = "video";

/// A service to be announced on the network
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceRecord {
    /// Instance name, e.g. "Webcam1 on 10.0.0.5"
    pub name: String,

    /// Base service type, e.g. "_machinekit._tcp"
    pub service_type: String,

    /// Subtype marker, e.g. "_video"
    pub subtype: Option<String>,

    /// Address the service listens on
    pub ip: Ipv4Addr,

    /// Port the service listens on
    pub port: u16,

    /// TXT properties, in announcement order
    pub properties: Vec<(String, String)>,
}

impl ServiceRecord {
    /// Builds the record of a video stream.
    ///
    /// Every call draws a fresh `instance` identifier, so a device that is
    /// stopped and started again is announced as a new instance.
    pub fn video(
        device_name: &str,
        ip: Ipv4Addr,
        port: u16,
        dsn: impl Into<String>,
        installation_uuid: &str,
    ) -> Self {
        Self {
            name: discovery_name(device_name, ip),
            service_type: MACHINEKIT_SERVICE_TYPE.to_string(),
            subtype: Some(VIDEO_SUBTYPE.to_string()),
            ip,
            port,
            properties: vec![
                (TXT_DSN.to_string(), dsn.into()),
                (TXT_UUID.to_string(), installation_uuid.to_string()),
                (TXT_SERVICE.to_string(), VIDEO_SERVICE.to_string()),
                (TXT_INSTANCE.to_string(), Uuid::new_v4().to_string()),
            ],
        }
    }

    /// Looks up a TXT property.
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// The per-publish instance identifier.
    pub fn instance(&self) -> Option<&str> {
        self.property(TXT_INSTANCE)
    }

    /// Service type as handed to a DNS-SD registration API
    /// (`_video._sub._machinekit._tcp.<domain>`).
    pub fn registration_type(&self, domain: &str) -> String {
        match self.subtype {
            Some(ref subtype) => format!("{}._sub.{}.{}", subtype, self.service_type, domain),
            None => format!("{}.{}", self.service_type, domain),
        }
    }
}

/// Discovery name of a device stream: `"<device> on <ip>"`.
pub fn discovery_name(device_name: &str, ip: Ipv4Addr) -> String {
    format!("{} on {}", device_name, ip)
}

/// Handle to a published record, needed to withdraw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    /// Instance name the record was published under
    pub name: String,

    /// Fully qualified DNS-SD name
    pub fullname: String,

    /// Instance identifier carried in the TXT record
    pub instance: String,
}

impl fmt::Display for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fullname)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> ServiceRecord {
        ServiceRecord::video(
            "Webcam1",
            Ipv4Addr::new(10, 0, 0, 5),
            5600,
            "tcp://10.0.0.5:5600",
            "a42c8c6b-4025-4f83-ba28-dad21114744a",
        )
    }

    #[test]
    fn test_video_record_fields() {
        let record = record();
        assert_eq!(record.name, "Webcam1 on 10.0.0.5");
        assert_eq!(record.service_type, "_machinekit._tcp");
        assert_eq!(record.subtype.as_deref(), Some("_video"));
        assert_eq!(record.port, 5600);
    }

    #[test]
    fn test_video_txt_record() {
        let record = record();
        assert_eq!(record.property("dsn"), Some("tcp://10.0.0.5:5600"));
        assert_eq!(
            record.property("uuid"),
            Some("a42c8c6b-4025-4f83-ba28-dad21114744a")
        );
        assert_eq!(record.property("service"), Some("video"));

        let instance = record.instance().unwrap();
        assert!(Uuid::parse_str(instance).is_ok());
    }

    #[test]
    fn test_fresh_instance_per_record() {
        assert_ne!(record().instance(), record().instance());
    }

    #[test]
    fn test_registration_type() {
        let record = record();
        assert_eq!(
            record.registration_type("local."),
            "_video._sub._machinekit._tcp.local."
        );

        let plain = ServiceRecord {
            subtype: None,
            ..record
        };
        assert_eq!(plain.registration_type("local."), "_machinekit._tcp.local.");
    }
}
