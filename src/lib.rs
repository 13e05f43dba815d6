//! Machinekit video server
//!
//! Supervises one `mjpg_streamer` process per configured capture device and
//! advertises each running stream over DNS-SD. The binary wires the
//! workspace crates together; this library holds its startup sequence.

pub mod startup;

pub use startup::{prepare, select_interface, Environment, Startup};
