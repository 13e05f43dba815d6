//! Startup ordering of the video server

mod common;

use common::*;
use std::net::Ipv4Addr;
use std::process::Command;
use videoserver::{prepare, Environment};
use videoserver_core::{ConfigError, NetworkInterface, VideoServerError};

#[test]
fn test_missing_uuid_fails_before_device_table() {
    let workspace = Workspace::new();
    // The device table does not exist; a UUID error proves it was never read
    let config = workspace.config_with_devices(&workspace.path().join("missing.ini"));

    let err = prepare(&config, &Environment::default(), host_interfaces).unwrap_err();

    match err {
        VideoServerError::Config(ConfigError::EnvironmentVariableError { details }) => {
            assert_eq!(details, "no MKUUID environment variable set");
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_prepare_with_explicit_uuid() {
    let workspace = Workspace::new();
    let devices = workspace.write("video.ini", VIDEO_INI);
    let config = workspace.config_with_devices(&devices);

    let env = Environment {
        mkuuid: Some(INSTALLATION_UUID.to_string()),
        machinekit_ini: None,
    };
    let startup = prepare(&config, &env, host_interfaces).unwrap();

    assert_eq!(startup.installation_uuid, INSTALLATION_UUID);
    assert_eq!(startup.interface.name, "wlan0");
    assert_eq!(startup.devices.names(), vec!["Webcam1"]);
}

#[test]
fn test_prepare_from_master_config() {
    let workspace = Workspace::new();
    let devices = workspace.write("video.ini", VIDEO_INI);
    let master = workspace.master_ini(&format!(
        "MKUUID = {}\nREMOTE = 1\nINTERFACES = eth wlan",
        INSTALLATION_UUID
    ));
    let config = workspace.config_with_devices(&devices);

    let env = Environment {
        mkuuid: None,
        machinekit_ini: Some(master),
    };
    let startup = prepare(&config, &env, host_interfaces).unwrap();

    assert_eq!(startup.installation_uuid, INSTALLATION_UUID);
    assert_eq!(
        startup.interface,
        NetworkInterface::new("eth0", Ipv4Addr::new(10, 0, 0, 5))
    );
}

#[test]
fn test_local_only_master_config_uses_loopback() {
    let workspace = Workspace::new();
    let devices = workspace.write("video.ini", VIDEO_INI);
    let master = workspace.master_ini("REMOTE = 0");
    let config = workspace.config_with_devices(&devices);

    let env = Environment {
        mkuuid: Some(INSTALLATION_UUID.to_string()),
        machinekit_ini: Some(master),
    };
    let startup = prepare(&config, &env, host_interfaces).unwrap();

    assert_eq!(startup.interface, NetworkInterface::loopback());
}

#[test]
fn test_no_matching_interface_is_fatal() {
    let workspace = Workspace::new();
    let devices = workspace.write("video.ini", VIDEO_INI);
    let mut config = workspace.config_with_devices(&devices);
    config.network.interfaces = vec!["usb".to_string()];

    let env = Environment {
        mkuuid: Some(INSTALLATION_UUID.to_string()),
        machinekit_ini: None,
    };
    let err = prepare(&config, &env, host_interfaces).unwrap_err();

    assert!(matches!(err, VideoServerError::Interface(_)));
}

#[test]
fn test_binary_exits_nonzero_without_uuid() {
    let workspace = Workspace::new();

    let output = Command::new(env!("CARGO_BIN_EXE_videoserver"))
        .current_dir(workspace.path())
        .env_remove("MKUUID")
        .env_remove("MACHINEKIT_INI")
        .env("RUST_LOG", "off")
        .output()
        .expect("Failed to run videoserver");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Startup failed"), "{}", stderr);
    assert!(stderr.contains("no MKUUID environment variable set"), "{}", stderr);
}
