//! Device lifecycle supervisor for the machinekit video server
//!
//! For each configured capture device the supervisor can:
//! - allocate an ephemeral port
//! - launch `mjpg_streamer` serving the device on `tcp://<ip>:<port>`
//! - advertise the stream through a [`videoserver_discovery::Publisher`]
//!
//! and tear the stream and its advertisement down together.
//!
//! The process and port seams are traits ([`Launcher`], [`PortAllocator`])
//! so the state machine can be driven without real streamers.
//!
//! # Example
//!
//! ```no_run
//! use videoserver_core::{DeviceTable, NetworkInterface};
//! use videoserver_core::discovery_config::DiscoveryConfig;
//! use videoserver_discovery::build_publisher;
//! use videoserver_supervisor::{ChildLauncher, Supervisor, SupervisorSettings};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let devices = DeviceTable::from_ini_file("video.ini")?;
//!     let interface = NetworkInterface::loopback();
//!     let publisher = build_publisher(&DiscoveryConfig::default(), interface.ip)?;
//!
//!     let settings = SupervisorSettings::new(interface, "mkuuid");
//!     let mut supervisor = Supervisor::new(devices, settings, publisher, ChildLauncher::new());
//!
//!     supervisor.start("Webcam1")?;
//!     supervisor.run(async { tokio::signal::ctrl_c().await.ok(); }).await;
//!
//!     Ok(())
//! }
//! ```

pub mod command;
pub mod error;
pub mod port;
pub mod process;
pub mod state;
pub mod supervisor;

pub use command::{stream_uri, StreamerCommand};
pub use error::{Result, SupervisorError};
pub use port::{EphemeralPortAllocator, PortAllocator};
pub use process::{ChildLauncher, ChildProcess, Launcher, StreamProcess};
pub use state::{DeviceRuntime, DeviceState, DeviceStatus};
pub use supervisor::{StartOutcome, StopOutcome, Supervisor, SupervisorSettings};
