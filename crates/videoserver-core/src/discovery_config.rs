//! Configuration types for service discovery

use serde::{Deserialize, Serialize};

/// DNS-SD service type all machinekit services are published under.
pub const MACHINEKIT_SERVICE_TYPE: &str = "_machinekit._tcp";

/// Subtype marking video streams.
pub const VIDEO_SUBTYPE: &str = "_video";

/// Configuration for publishing video streams
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Which discovery backend publishes the records
    #[serde(default)]
    pub backend: DiscoveryBackend,

    /// mDNS domain the records are published in
    #[serde(default = "default_domain")]
    pub domain: String,

    /// Host name to announce (defaults to the system host name)
    #[serde(default)]
    pub hostname: Option<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            backend: DiscoveryBackend::default(),
            domain: default_domain(),
            hostname: None,
        }
    }
}

impl DiscoveryConfig {
    /// Validates the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.domain.is_empty() {
            return Err("discovery.domain cannot be empty".to_string());
        }

        if !self.domain.ends_with('.') {
            return Err(format!(
                "discovery.domain must be fully qualified (end with '.'): {}",
                self.domain
            ));
        }

        if let Some(ref hostname) = self.hostname {
            if hostname.is_empty() {
                return Err("discovery.hostname cannot be empty when set".to_string());
            }
        }

        Ok(())
    }

    /// Full mDNS service type for video streams, including the subtype.
    ///
    /// e.g. `_video._sub._machinekit._tcp.local.`
    pub fn video_service_type(&self) -> String {
        format!(
            "{}._sub.{}.{}",
            VIDEO_SUBTYPE, MACHINEKIT_SERVICE_TYPE, self.domain
        )
    }
}

/// Discovery backend selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryBackend {
    /// Built-in multicast DNS responder
    #[default]
    Mdns,

    /// Streams run without being advertised
    Disabled,
}

impl DiscoveryBackend {
    /// Returns a human-readable description
    pub fn description(&self) -> &str {
        match self {
            DiscoveryBackend::Mdns => "Multicast DNS (DNS-SD)",
            DiscoveryBackend::Disabled => "Discovery disabled",
        }
    }
}

fn default_domain() -> String {
    "local.".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_service_type() {
        let config = DiscoveryConfig::default();
        assert_eq!(
            config.video_service_type(),
            "_video._sub._machinekit._tcp.local."
        );
    }

    #[test]
    fn test_validate_domain() {
        let config = DiscoveryConfig {
            domain: "local".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
        assert!(DiscoveryConfig::default().validate().is_ok());
    }

    #[test]
    fn test_backend_deserialize() {
        let backend: DiscoveryBackend = serde_yaml::from_str("disabled").unwrap();
        assert_eq!(backend, DiscoveryBackend::Disabled);
    }
}
