//! Application settings for the video server.
//!
//! Settings are optional: every field has a default matching the stock
//! machinekit installation. They can be loaded from a YAML file and
//! overridden through `VIDEOSERVER__*` environment variables, e.g.
//! `VIDEOSERVER__STREAMER__BINARY=/opt/bin/mjpg_streamer`.

use crate::discovery_config::DiscoveryConfig;
use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::Level;

/// Prefix of environment variables overriding settings.
pub const ENV_PREFIX: &str = "VIDEOSERVER";

/// Main application configuration.
///
/// # Examples
///
/// ```no_run
/// use videoserver_core::config::AppConfig;
///
/// let config = AppConfig::load(Some("videoserver.yaml")).unwrap();
/// config.validate().unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Device table location and startup devices
    #[serde(default)]
    pub devices: DevicesConfig,

    /// External streaming program
    #[serde(default)]
    pub streamer: StreamerConfig,

    /// Interface selection and advertised URIs
    #[serde(default)]
    pub network: NetworkConfig,

    /// Service discovery
    #[serde(default)]
    pub discovery: DiscoveryConfig,

    /// Supervisor loop behaviour
    #[serde(default)]
    pub supervisor: SupervisorConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| {
            ConfigError::InvalidFormat {
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// Loads configuration using the `config` crate, layering
    /// `VIDEOSERVER__*` environment variables over the file.
    ///
    /// With `None`, the file is optional and defaults apply when it is absent.
    pub fn load<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        let (path, required) = match path {
            Some(p) => (p.as_ref().to_path_buf(), true),
            None => (PathBuf::from(default_config_path()), false),
        };

        if required && !path.exists() {
            return Err(ConfigError::file_not_found(path.display().to_string()).into());
        }

        let config = config::Config::builder()
            .add_source(config::File::from(path.as_path()).required(required))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("network.interfaces")
                    .with_list_parse_key("devices.autostart")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| ConfigError::LoadFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        config.try_deserialize().map_err(|e| {
            ConfigError::InvalidFormat {
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        self.devices.validate()?;
        self.streamer.validate()?;
        self.network.validate()?;
        self.discovery
            .validate()
            .map_err(ConfigError::validation_failed)?;
        self.supervisor.validate()?;
        self.logging.parse_level()?;
        Ok(())
    }
}

fn default_config_path() -> &'static str {
    "videoserver.yaml"
}

/// Device table settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DevicesConfig {
    /// Path of the ini device table
    #[serde(default = "default_devices_file")]
    pub file: PathBuf,

    /// Devices started automatically at startup
    #[serde(default = "default_autostart")]
    pub autostart: Vec<String>,
}

fn default_devices_file() -> PathBuf {
    PathBuf::from("video.ini")
}

fn default_autostart() -> Vec<String> {
    vec!["Webcam1".to_string()]
}

impl Default for DevicesConfig {
    fn default() -> Self {
        Self {
            file: default_devices_file(),
            autostart: default_autostart(),
        }
    }
}

impl DevicesConfig {
    pub fn validate(&self) -> Result<()> {
        if self.file.as_os_str().is_empty() {
            return Err(ConfigError::invalid_value("devices.file", "path cannot be empty").into());
        }

        if self.autostart.iter().any(|name| name.is_empty()) {
            return Err(ConfigError::invalid_value(
                "devices.autostart",
                "device names cannot be empty",
            )
            .into());
        }

        Ok(())
    }
}

/// External streaming program settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamerConfig {
    /// Program name or path
    #[serde(default = "default_streamer_binary")]
    pub binary: String,

    /// Directory holding the streamer plugins, also used as `LD_LIBRARY_PATH`
    #[serde(default = "default_plugin_dir")]
    pub plugin_dir: String,

    /// Capture-stage plugin
    #[serde(default = "default_input_plugin")]
    pub input_plugin: String,

    /// Output-stage plugin
    #[serde(default = "default_output_plugin")]
    pub output_plugin: String,
}

fn default_streamer_binary() -> String {
    "mjpg_streamer".to_string()
}

fn default_plugin_dir() -> String {
    "/usr/local/lib/".to_string()
}

fn default_input_plugin() -> String {
    "input_uvc.so".to_string()
}

fn default_output_plugin() -> String {
    "output_zmqserver.so".to_string()
}

impl Default for StreamerConfig {
    fn default() -> Self {
        Self {
            binary: default_streamer_binary(),
            plugin_dir: default_plugin_dir(),
            input_plugin: default_input_plugin(),
            output_plugin: default_output_plugin(),
        }
    }
}

impl StreamerConfig {
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("streamer.binary", &self.binary),
            ("streamer.input_plugin", &self.input_plugin),
            ("streamer.output_plugin", &self.output_plugin),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::invalid_value(field, "cannot be empty").into());
            }
        }

        Ok(())
    }

    /// Full path of a plugin, prefixed with the plugin directory.
    pub fn plugin_path(&self, plugin: &str) -> String {
        format!("{}{}", self.plugin_dir, plugin)
    }
}

/// Network settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Interface name prefixes in order of preference
    #[serde(default = "default_interfaces")]
    pub interfaces: Vec<String>,

    /// Scheme of advertised stream URIs
    #[serde(default = "default_uri_scheme")]
    pub uri_scheme: String,
}

fn default_interfaces() -> Vec<String> {
    vec!["wlan".to_string(), "eth".to_string(), "usb".to_string()]
}

fn default_uri_scheme() -> String {
    "tcp".to_string()
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            interfaces: default_interfaces(),
            uri_scheme: default_uri_scheme(),
        }
    }
}

impl NetworkConfig {
    pub fn validate(&self) -> Result<()> {
        if self.interfaces.is_empty() {
            return Err(ConfigError::invalid_value(
                "network.interfaces",
                "at least one interface prefix must be configured",
            )
            .into());
        }

        if self.uri_scheme.is_empty() || self.uri_scheme.contains("://") {
            return Err(ConfigError::invalid_value(
                "network.uri_scheme",
                format!("invalid scheme '{}'", self.uri_scheme),
            )
            .into());
        }

        Ok(())
    }
}

/// Supervisor loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupervisorConfig {
    /// Background loop tick in milliseconds
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// What to do with a freshly launched stream whose advertisement failed
    #[serde(default)]
    pub on_publish_failure: PublishFailurePolicy,
}

fn default_poll_interval() -> u64 {
    1000
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval(),
            on_publish_failure: PublishFailurePolicy::default(),
        }
    }
}

impl SupervisorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::invalid_value(
                "supervisor.poll_interval_ms",
                "must be greater than 0",
            )
            .into());
        }

        Ok(())
    }

    /// Returns the poll interval as a Duration.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Handling of a stream whose discovery record could not be published.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishFailurePolicy {
    /// Leave the stream running without an advertisement
    #[default]
    KeepRunning,

    /// Terminate the stream so it is never running unadvertised
    StopStream,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format
    #[serde(default = "default_log_format")]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> LogFormat {
    LogFormat::Text
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl LoggingConfig {
    /// Parses the log level string to a tracing Level.
    pub fn parse_level(&self) -> Result<Level> {
        self.level.parse().map_err(|_| {
            ConfigError::InvalidValue {
                field: "logging.level".to_string(),
                reason: format!("Invalid log level: {}", self.level),
            }
            .into()
        })
    }
}

/// Log format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text format
    Text,
    /// JSON format for structured logging
    Json,
}
