//! Streaming program invocation
//!
//! `mjpg_streamer` takes one argument per pipeline stage. Each stage argument
//! names a plugin followed by that plugin's own flags; the streamer splits it
//! internally. The flag names are the streamer's interface and must not change:
//!
//! ```text
//! mjpg_streamer \
//!   -i "<plugin_dir>input_uvc.so -n -f <fps> -r <resolution> [-q <quality>] -d <device>" \
//!   -o "<plugin_dir>output_zmqserver.so --address tcp://<ip>:<port> --buffer_size <n>"
//! ```

use std::fmt;
use std::net::Ipv4Addr;
use videoserver_core::config::StreamerConfig;
use videoserver_core::types::DeviceConfig;

/// Library search path variable pointed at the plugin directory
pub const LIBRARY_PATH_ENV: &str = "LD_LIBRARY_PATH";

/// URI a stream is served and advertised on, e.g. `tcp://10.0.0.5:5600`.
pub fn stream_uri(scheme: &str, ip: Ipv4Addr, port: u16) -> String {
    format!("{}://{}:{}", scheme, ip, port)
}

/// A fully built streamer command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamerCommand {
    /// Program to run
    pub program: String,

    /// Discrete arguments, passed without a shell
    pub args: Vec<String>,

    /// Environment overrides on top of the inherited environment
    pub env: Vec<(String, String)>,
}

impl StreamerCommand {
    /// Builds the command streaming `device` on `uri`.
    pub fn build(streamer: &StreamerConfig, device: &DeviceConfig, uri: &str) -> Self {
        let mut input = format!(
            "{} -n -f {} -r {}",
            streamer.plugin_path(&streamer.input_plugin),
            device.framerate,
            device.resolution
        );
        if let Some(ref quality) = device.quality {
            input.push_str(&format!(" -q {}", quality));
        }
        input.push_str(&format!(" -d {}", device.device));

        let output = format!(
            "{} --address {} --buffer_size {}",
            streamer.plugin_path(&streamer.output_plugin),
            uri,
            device.buffer_size
        );

        Self {
            program: streamer.binary.clone(),
            args: vec!["-i".to_string(), input, "-o".to_string(), output],
            env: vec![(LIBRARY_PATH_ENV.to_string(), streamer.plugin_dir.clone())],
        }
    }

    /// The capture-stage argument
    pub fn input_stage(&self) -> Option<&str> {
        self.stage("-i")
    }

    /// The output-stage argument
    pub fn output_stage(&self) -> Option<&str> {
        self.stage("-o")
    }

    fn stage(&self, flag: &str) -> Option<&str> {
        self.args
            .iter()
            .position(|a| a == flag)
            .and_then(|i| self.args.get(i + 1))
            .map(String::as_str)
    }
}

impl fmt::Display for StreamerCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.contains(' ') {
                write!(f, " \"{}\"", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}
