//! Device lifecycle supervisor
//!
//! Per device: `IDLE --start--> RUNNING --stop--> IDLE`. Starting a running
//! device or stopping an idle one is logged and otherwise ignored. A stream
//! process that exits on its own is noticed by the background loop and the
//! device returns to idle.

use crate::command::{stream_uri, StreamerCommand};
use crate::error::{Result, SupervisorError};
use crate::port::{EphemeralPortAllocator, PortAllocator};
use crate::process::{Launcher, StreamProcess};
use crate::state::{DeviceRuntime, DeviceStatus};
use chrono::Utc;
use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};
use videoserver_core::config::{AppConfig, PublishFailurePolicy, StreamerConfig};
use videoserver_core::devices::DeviceTable;
use videoserver_core::types::NetworkInterface;
use videoserver_discovery::{discovery_name, Publisher, ServiceRecord};

/// Settings shared by all devices of one supervisor
#[derive(Debug, Clone)]
pub struct SupervisorSettings {
    /// Interface streams are served and advertised on
    pub interface: NetworkInterface,

    /// Installation UUID announced in every record
    pub installation_uuid: String,

    /// Streaming program
    pub streamer: StreamerConfig,

    /// Scheme of stream URIs
    pub uri_scheme: String,

    /// Background loop tick
    pub poll_interval: Duration,

    /// Handling of failed advertisements
    pub on_publish_failure: PublishFailurePolicy,
}

impl SupervisorSettings {
    pub fn new(interface: NetworkInterface, installation_uuid: impl Into<String>) -> Self {
        Self::from_config(&AppConfig::default(), interface, installation_uuid)
    }

    pub fn from_config(
        config: &AppConfig,
        interface: NetworkInterface,
        installation_uuid: impl Into<String>,
    ) -> Self {
        Self {
            interface,
            installation_uuid: installation_uuid.into(),
            streamer: config.streamer.clone(),
            uri_scheme: config.network.uri_scheme.clone(),
            poll_interval: config.supervisor.poll_interval(),
            on_publish_failure: config.supervisor.on_publish_failure,
        }
    }
}

/// Result of a `start` call that did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    /// The stream was launched
    Started {
        port: u16,
        uri: String,
        advertised: bool,
    },

    /// The device was already running; nothing was done
    AlreadyRunning,

    /// The advertisement failed and the stream was stopped again
    PublishFailed,
}

/// Result of a `stop` call that did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    Stopped,

    /// The device was not running; nothing was done
    NotRunning,
}

/// Starts, stops and watches the streams of the configured devices.
pub struct Supervisor<P, L, A = EphemeralPortAllocator>
where
    P: Publisher,
    L: Launcher,
    A: PortAllocator,
{
    devices: DeviceTable,
    settings: SupervisorSettings,
    publisher: P,
    launcher: L,
    ports: A,
    runtime: HashMap<String, DeviceRuntime<L::Process>>,
}

impl<P, L> Supervisor<P, L, EphemeralPortAllocator>
where
    P: Publisher,
    L: Launcher,
{
    /// Creates a supervisor allocating ports from the operating system.
    pub fn new(devices: DeviceTable, settings: SupervisorSettings, publisher: P, launcher: L) -> Self {
        Self::with_port_allocator(
            devices,
            settings,
            publisher,
            launcher,
            EphemeralPortAllocator::default(),
        )
    }
}

impl<P, L, A> Supervisor<P, L, A>
where
    P: Publisher,
    L: Launcher,
    A: PortAllocator,
{
    pub fn with_port_allocator(
        devices: DeviceTable,
        settings: SupervisorSettings,
        publisher: P,
        launcher: L,
        ports: A,
    ) -> Self {
        info!(
            devices = ?devices.names(),
            interface = %settings.interface,
            backend = publisher.name(),
            "Video supervisor created"
        );

        Self {
            devices,
            settings,
            publisher,
            launcher,
            ports,
            runtime: HashMap::new(),
        }
    }

    /// Launches the stream of a device and advertises it.
    pub fn start(&mut self, name: &str) -> Result<StartOutcome> {
        let device = self
            .devices
            .get(name)
            .ok_or_else(|| SupervisorError::unknown_device(name))?;

        if self.runtime.contains_key(name) {
            info!(device = name, "Video device already running");
            return Ok(StartOutcome::AlreadyRunning);
        }

        let ip = self.settings.interface.ip;
        let port = self
            .ports
            .allocate()
            .map_err(SupervisorError::PortAllocation)?;
        let uri = stream_uri(&self.settings.uri_scheme, ip, port);
        let discovery_name = discovery_name(name, ip);

        debug!(device = name, dsn = %uri, port, "Allocated stream endpoint");

        let command = StreamerCommand::build(&self.settings.streamer, device, &uri);
        info!(device = name, command = %command, "Launching stream process");

        let process = self.launcher.launch(name, &command)?;

        let record = ServiceRecord::video(
            name,
            ip,
            port,
            uri.clone(),
            &self.settings.installation_uuid,
        );

        let registration = match self.publisher.publish(&record) {
            Ok(registration) => Some(registration),
            Err(e) => {
                error!(device = name, error = %e, "Cannot register DNS service");

                if self.settings.on_publish_failure == PublishFailurePolicy::StopStream {
                    if let Err(e) = process.terminate() {
                        warn!(device = name, error = %e, "Failed to stop unadvertised stream");
                    }
                    return Ok(StartOutcome::PublishFailed);
                }

                None
            }
        };

        let advertised = registration.is_some();
        self.runtime.insert(
            name.to_string(),
            DeviceRuntime {
                port,
                process,
                registration,
                discovery_name,
                uri: uri.clone(),
                started_at: Utc::now(),
            },
        );

        info!(device = name, uri = %uri, advertised, "Video device started");
        Ok(StartOutcome::Started {
            port,
            uri,
            advertised,
        })
    }

    /// Withdraws the advertisement of a device and terminates its stream.
    pub fn stop(&mut self, name: &str) -> Result<StopOutcome> {
        if !self.devices.contains(name) {
            return Err(SupervisorError::unknown_device(name));
        }

        let Some(runtime) = self.runtime.remove(name) else {
            info!(device = name, "Video device not running");
            return Ok(StopOutcome::NotRunning);
        };

        self.teardown(name, runtime);
        info!(device = name, "Video device stopped");
        Ok(StopOutcome::Stopped)
    }

    /// Stops every running device.
    pub fn stop_all(&mut self) {
        let running: Vec<String> = self.runtime.keys().cloned().collect();
        for name in running {
            if let Err(e) = self.stop(&name) {
                warn!(device = %name, error = %e, "Failed to stop video device");
            }
        }
    }

    /// Returns devices whose stream process exited on its own to idle.
    ///
    /// Returns the names of those devices.
    pub fn check_children(&mut self) -> Vec<String> {
        let mut exited = Vec::new();

        for (name, runtime) in self.runtime.iter_mut() {
            match runtime.process.try_wait() {
                Ok(Some(status)) => {
                    warn!(device = %name, %status, "Stream process exited unexpectedly");
                    exited.push(name.clone());
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(device = %name, error = %e, "Failed to poll stream process");
                }
            }
        }

        for name in &exited {
            if let Some(runtime) = self.runtime.remove(name) {
                self.teardown(name, runtime);
            }
        }

        exited
    }

    /// Runs the background loop until `shutdown` resolves, then stops every
    /// device, waits for the stream processes to exit and shuts the discovery
    /// backend down.
    pub async fn run<F>(&mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let mut ticker = tokio::time::interval(self.settings.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        info!(
            interval_ms = self.settings.poll_interval.as_millis() as u64,
            "Supervisor loop running"
        );

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested, stopping video devices");
                    break;
                }
                _ = ticker.tick() => {
                    self.publisher.poll_events();
                    self.check_children();
                }
            }
        }

        self.stop_all();
        self.launcher.wait_terminated().await;

        if let Err(e) = self.publisher.shutdown() {
            warn!(error = %e, "Failed to shut down discovery backend");
        }
    }

    /// Whether the device has a running stream.
    pub fn is_running(&self, name: &str) -> bool {
        self.runtime.contains_key(name)
    }

    /// Status of every configured device, in device table order.
    pub fn statuses(&self) -> Vec<DeviceStatus> {
        self.devices
            .names()
            .into_iter()
            .map(|name| match self.runtime.get(name) {
                Some(runtime) => DeviceStatus::running(name, runtime),
                None => DeviceStatus::idle(name),
            })
            .collect()
    }

    /// Runtime state of a running device.
    pub fn runtime(&self, name: &str) -> Option<&DeviceRuntime<L::Process>> {
        self.runtime.get(name)
    }

    pub fn devices(&self) -> &DeviceTable {
        &self.devices
    }

    pub fn settings(&self) -> &SupervisorSettings {
        &self.settings
    }

    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    fn teardown(&mut self, name: &str, runtime: DeviceRuntime<L::Process>) {
        if let Some(registration) = runtime.registration {
            if let Err(e) = self.publisher.unpublish(registration) {
                warn!(device = name, error = %e, "Failed to unregister DNS service");
            }
        }

        if let Err(e) = runtime.process.terminate() {
            warn!(device = name, error = %e, "Failed to terminate stream process");
        }

        debug!(
            device = name,
            service = %runtime.discovery_name,
            port = runtime.port,
            "Released stream endpoint"
        );
    }
}
