//! Per-device runtime state

use crate::process::StreamProcess;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use videoserver_discovery::Registration;

/// Lifecycle state of a device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceState {
    /// No stream process
    Idle,
    /// Stream process running
    Running,
}

impl fmt::Display for DeviceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceState::Idle => write!(f, "idle"),
            DeviceState::Running => write!(f, "running"),
        }
    }
}

/// State of a running device. Exists only between `start` and `stop`.
#[derive(Debug)]
pub struct DeviceRuntime<P: StreamProcess> {
    /// Port the stream is served on
    pub port: u16,

    /// Streamer process
    pub process: P,

    /// Discovery registration, absent only if publishing failed
    pub registration: Option<Registration>,

    /// `"<device> on <ip>"`
    pub discovery_name: String,

    /// `tcp://<ip>:<port>`
    pub uri: String,

    pub started_at: DateTime<Utc>,
}

/// Read-only snapshot of a device for status reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceStatus {
    pub name: String,
    pub state: DeviceState,
    pub port: Option<u16>,
    pub uri: Option<String>,
    pub pid: Option<u32>,
    pub advertised: bool,
    pub started_at: Option<DateTime<Utc>>,
}

impl DeviceStatus {
    /// Status of a device without a runtime entry.
    pub fn idle(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: DeviceState::Idle,
            port: None,
            uri: None,
            pid: None,
            advertised: false,
            started_at: None,
        }
    }

    /// Status of a running device.
    pub fn running<P: StreamProcess>(name: impl Into<String>, runtime: &DeviceRuntime<P>) -> Self {
        Self {
            name: name.into(),
            state: DeviceState::Running,
            port: Some(runtime.port),
            uri: Some(runtime.uri.clone()),
            pid: runtime.process.id(),
            advertised: runtime.registration.is_some(),
            started_at: Some(runtime.started_at),
        }
    }
}
