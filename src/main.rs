use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use videoserver::{prepare, Environment};
use videoserver_core::config::{LogFormat, LoggingConfig};
use videoserver_core::interfaces::list_interfaces;
use videoserver_core::machinekit::{MACHINEKIT_INI_ENV, MKUUID_ENV};
use videoserver_core::AppConfig;
use videoserver_discovery::build_publisher;
use videoserver_supervisor::{ChildLauncher, Supervisor, SupervisorSettings};

/// Machinekit video server - supervises mjpg_streamer and announces streams
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the YAML settings file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the device table path
    #[arg(short, long)]
    devices: Option<PathBuf>,

    /// Devices to start instead of the configured ones
    #[arg(short, long = "start", value_name = "DEVICE")]
    start: Vec<String>,

    /// Installation UUID
    #[arg(long, env = MKUUID_ENV)]
    mkuuid: Option<String>,

    /// Machinekit master configuration
    #[arg(long, env = MACHINEKIT_INI_ENV)]
    machinekit_ini: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = AppConfig::load(args.config.as_deref()).context("Failed to load settings")?;
    init_logging(&config.logging, args.verbose)?;
    config.validate().context("Invalid settings")?;

    if let Some(devices) = args.devices {
        config.devices.file = devices;
    }
    if !args.start.is_empty() {
        config.devices.autostart = args.start;
    }

    let env = Environment {
        mkuuid: args.mkuuid,
        machinekit_ini: args.machinekit_ini,
    };
    let startup = prepare(&config, &env, list_interfaces).context("Startup failed")?;

    info!(
        interface = %startup.interface,
        uuid = %startup.installation_uuid,
        "Starting video server"
    );

    let publisher = build_publisher(&config.discovery, startup.interface.ip)
        .context("Failed to start service discovery")?;
    let settings =
        SupervisorSettings::from_config(&config, startup.interface, startup.installation_uuid);
    let mut supervisor = Supervisor::new(startup.devices, settings, publisher, ChildLauncher::new());

    for name in &config.devices.autostart {
        if let Err(e) = supervisor.start(name) {
            error!(device = %name, error = %e, "Failed to start video device");
        }
    }

    supervisor.run(shutdown_signal()).await;

    info!("Video server stopped");
    Ok(())
}

fn init_logging(logging: &LoggingConfig, verbose: bool) -> Result<()> {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        logging.parse_level()?
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_string().to_lowercase()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    match logging.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }

    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl-C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
