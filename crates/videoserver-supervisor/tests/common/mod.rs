//! Test doubles for driving the supervisor without real streamers

#![allow(dead_code)]

use std::collections::HashMap;
use std::future::Future;
use std::io;
use std::net::Ipv4Addr;
use std::os::unix::process::ExitStatusExt;
use std::process::ExitStatus;
use std::sync::{Arc, Mutex};
use videoserver_core::{DeviceTable, NetworkInterface};
use videoserver_discovery::{DiscoveryError, Publisher, Registration, ServiceRecord};
use videoserver_supervisor::{
    Launcher, PortAllocator, StreamProcess, StreamerCommand, Supervisor, SupervisorError,
    SupervisorSettings,
};

pub const VIDEO_INI: &str = r#"
[Webcam1]
framerate = 30
resolution = 640x480
device = /dev/video0
bufferSize = 2

[Webcam2]
framerate = 15
resolution = 1280x720
device = /dev/video1
bufferSize = 4
quality = 80
"#;

pub const INSTALLATION_UUID: &str = "a42c8c6b-4025-4f83-ba28-dad21114744a";

/// Records publish/unpublish calls
#[derive(Debug, Default)]
pub struct FakePublisher {
    pub published: Vec<ServiceRecord>,
    pub unpublished: Vec<Registration>,
    pub fail_publish: bool,
    pub polls: usize,
    pub shut_down: bool,
}

impl FakePublisher {
    pub fn failing() -> Self {
        Self {
            fail_publish: true,
            ..Default::default()
        }
    }
}

impl Publisher for FakePublisher {
    fn publish(&mut self, record: &ServiceRecord) -> videoserver_discovery::Result<Registration> {
        if self.fail_publish {
            return Err(DiscoveryError::RegisterFailed {
                service_name: record.name.clone(),
                reason: "daemon not running".to_string(),
            });
        }

        self.published.push(record.clone());
        Ok(Registration {
            name: record.name.clone(),
            fullname: format!("{}._machinekit._tcp.local.", record.name),
            instance: record.instance().unwrap_or_default().to_string(),
        })
    }

    fn unpublish(&mut self, registration: Registration) -> videoserver_discovery::Result<()> {
        self.unpublished.push(registration);
        Ok(())
    }

    fn poll_events(&mut self) {
        self.polls += 1;
    }

    fn shutdown(&mut self) -> videoserver_discovery::Result<()> {
        self.shut_down = true;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

/// Exit status slots and termination log shared between launcher and processes
#[derive(Debug, Default, Clone)]
pub struct ProcessTable {
    exits: Arc<Mutex<HashMap<u32, ExitStatus>>>,
    terminated: Arc<Mutex<Vec<u32>>>,
}

impl ProcessTable {
    /// Makes a process look like it exited with `code`.
    pub fn exit(&self, pid: u32, code: i32) {
        self.exits
            .lock()
            .unwrap()
            .insert(pid, ExitStatus::from_raw(code << 8));
    }

    pub fn terminated(&self) -> Vec<u32> {
        self.terminated.lock().unwrap().clone()
    }
}

#[derive(Debug)]
pub struct FakeProcess {
    pid: u32,
    table: ProcessTable,
}

impl StreamProcess for FakeProcess {
    fn id(&self) -> Option<u32> {
        Some(self.pid)
    }

    fn try_wait(&mut self) -> io::Result<Option<ExitStatus>> {
        Ok(self.table.exits.lock().unwrap().get(&self.pid).copied())
    }

    fn terminate(self) -> videoserver_supervisor::Result<()> {
        self.table.terminated.lock().unwrap().push(self.pid);
        Ok(())
    }
}

/// Hands out fake processes with increasing pids
#[derive(Debug, Default)]
pub struct FakeLauncher {
    pub launched: Vec<(String, StreamerCommand)>,
    pub table: ProcessTable,
    pub fail: bool,
    /// Times shutdown waited for terminated processes
    pub waits: usize,
    next_pid: u32,
}

impl FakeLauncher {
    pub fn new() -> Self {
        Self {
            next_pid: 1000,
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }
}

impl Launcher for FakeLauncher {
    type Process = FakeProcess;

    fn launch(
        &mut self,
        device: &str,
        command: &StreamerCommand,
    ) -> videoserver_supervisor::Result<FakeProcess> {
        if self.fail {
            return Err(SupervisorError::Launch {
                device: device.to_string(),
                program: command.program.clone(),
                source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
            });
        }

        self.next_pid += 1;
        self.launched.push((device.to_string(), command.clone()));
        Ok(FakeProcess {
            pid: self.next_pid,
            table: self.table.clone(),
        })
    }

    fn wait_terminated(&mut self) -> impl Future<Output = ()> + Send {
        self.waits += 1;
        async {}
    }
}

/// Returns ports from a fixed sequence and counts allocations
#[derive(Debug)]
pub struct FakePorts {
    next: u16,
    pub allocations: Arc<Mutex<usize>>,
}

impl FakePorts {
    pub fn starting_at(port: u16) -> Self {
        Self {
            next: port,
            allocations: Arc::new(Mutex::new(0)),
        }
    }
}

impl PortAllocator for FakePorts {
    fn allocate(&mut self) -> io::Result<u16> {
        *self.allocations.lock().unwrap() += 1;
        let port = self.next;
        self.next += 1;
        Ok(port)
    }
}

pub fn interface() -> NetworkInterface {
    NetworkInterface::new("eth0", Ipv4Addr::new(10, 0, 0, 5))
}

pub type TestSupervisor = Supervisor<FakePublisher, FakeLauncher, FakePorts>;

/// Supervisor over the test device table with fakes everywhere
pub fn supervisor_with(
    publisher: FakePublisher,
    settings: SupervisorSettings,
) -> (TestSupervisor, Arc<Mutex<usize>>) {
    let devices = DeviceTable::from_ini_str(VIDEO_INI).unwrap();
    let ports = FakePorts::starting_at(5600);
    let allocations = ports.allocations.clone();

    let supervisor =
        Supervisor::with_port_allocator(devices, settings, publisher, FakeLauncher::new(), ports);
    (supervisor, allocations)
}

pub fn supervisor() -> (TestSupervisor, Arc<Mutex<usize>>) {
    supervisor_with(
        FakePublisher::default(),
        SupervisorSettings::new(interface(), INSTALLATION_UUID),
    )
}
