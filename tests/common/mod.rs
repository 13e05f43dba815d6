//! Common test utilities and helpers for integration tests

#![allow(dead_code)]

use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use videoserver_core::{AppConfig, NetworkInterface};

pub const INSTALLATION_UUID: &str = "a42c8c6b-4025-4f83-ba28-dad21114744a";

pub const VIDEO_INI: &str = "\
[Webcam1]
framerate = 30
resolution = 640x480
device = /dev/video0
bufferSize = 2
";

/// Scratch directory holding the files a server reads at startup
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Writes a file into the workspace and returns its path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, contents)
            .unwrap_or_else(|_| panic!("Failed to write {:?}", path));
        path
    }

    /// Writes a master configuration with the given `[MACHINEKIT]` entries.
    pub fn master_ini(&self, entries: &str) -> PathBuf {
        self.write("machinekit.ini", &format!("[MACHINEKIT]\n{}\n", entries))
    }

    /// Settings pointing at `devices` inside this workspace.
    pub fn config_with_devices(&self, devices: &Path) -> AppConfig {
        let mut config = AppConfig::default();
        config.devices.file = devices.to_path_buf();
        config
    }
}

/// Interfaces of a typical host with wired and wireless links
pub fn host_interfaces() -> videoserver_core::Result<Vec<NetworkInterface>> {
    Ok(vec![
        NetworkInterface::loopback(),
        NetworkInterface::new("eth0", Ipv4Addr::new(10, 0, 0, 5)),
        NetworkInterface::new("wlan0", Ipv4Addr::new(192, 168, 1, 20)),
    ])
}
