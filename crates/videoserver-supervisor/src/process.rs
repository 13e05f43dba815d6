//! Launching and signalling streamer processes

use crate::command::StreamerCommand;
use crate::error::{Result, SupervisorError};
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use std::future::Future;
use std::process::{ExitStatus, Stdio};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Starts streamer processes.
pub trait Launcher: Send {
    type Process: StreamProcess;

    /// Starts `command` for the named device.
    fn launch(&mut self, device: &str, command: &StreamerCommand) -> Result<Self::Process>;

    /// Resolves once every terminated process has exited.
    fn wait_terminated(&mut self) -> impl Future<Output = ()> + Send {
        async {}
    }
}

/// A running streamer process.
pub trait StreamProcess: Send {
    /// OS process id, if the process has not been reaped yet
    fn id(&self) -> Option<u32>;

    /// Checks without blocking whether the process has exited.
    fn try_wait(&mut self) -> std::io::Result<Option<ExitStatus>>;

    /// Sends the termination signal. The process is reaped in the background.
    fn terminate(self) -> Result<()>;
}

/// Launches streamers as child processes of the supervisor.
///
/// Children inherit the environment plus the command's overrides. Their
/// stdout and stderr are forwarded line by line to the log. Terminated
/// children are reaped by tasks the launcher keeps track of, so shutdown can
/// wait for them instead of killing them when the runtime goes away.
#[derive(Debug, Default, Clone)]
pub struct ChildLauncher {
    reapers: Reapers,
}

impl ChildLauncher {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Reaper tasks of signalled children
#[derive(Debug, Default, Clone)]
struct Reapers(Arc<Mutex<JoinSet<()>>>);

impl Reapers {
    fn lock(&self) -> MutexGuard<'_, JoinSet<()>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn take(&self) -> JoinSet<()> {
        std::mem::take(&mut *self.lock())
    }
}

impl Launcher for ChildLauncher {
    type Process = ChildProcess;

    fn launch(&mut self, device: &str, command: &StreamerCommand) -> Result<ChildProcess> {
        let mut child = Command::new(&command.program)
            .args(&command.args)
            .envs(command.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| SupervisorError::Launch {
                device: device.to_string(),
                program: command.program.clone(),
                source,
            })?;

        if let Some(stdout) = child.stdout.take() {
            tokio::spawn(forward_output(device.to_string(), stdout));
        }
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(forward_output(device.to_string(), stderr));
        }

        info!(device, pid = ?child.id(), "Stream process started");

        Ok(ChildProcess {
            device: device.to_string(),
            child,
            reapers: self.reapers.clone(),
        })
    }

    fn wait_terminated(&mut self) -> impl Future<Output = ()> + Send {
        let mut reapers = self.reapers.take();

        async move {
            if !reapers.is_empty() {
                info!(count = reapers.len(), "Waiting for stream processes to exit");
            }
            while reapers.join_next().await.is_some() {}
        }
    }
}

/// Forwards a child's output stream to the log.
async fn forward_output<R: AsyncRead + Unpin>(device: String, reader: R) {
    let mut lines = BufReader::new(reader).lines();

    loop {
        match lines.next_line().await {
            Ok(Some(line)) => debug!(device = %device, "{}", line),
            Ok(None) => break,
            Err(e) => {
                warn!(device = %device, error = %e, "Error reading stream process output");
                break;
            }
        }
    }
}

/// A streamer started by [`ChildLauncher`].
#[derive(Debug)]
pub struct ChildProcess {
    device: String,
    child: Child,
    reapers: Reapers,
}

impl StreamProcess for ChildProcess {
    fn id(&self) -> Option<u32> {
        self.child.id()
    }

    fn try_wait(&mut self) -> std::io::Result<Option<ExitStatus>> {
        self.child.try_wait()
    }

    fn terminate(self) -> Result<()> {
        let ChildProcess {
            device,
            mut child,
            reapers,
        } = self;

        // Already reaped, nothing left to signal
        let Some(pid) = child.id() else {
            return Ok(());
        };

        kill(Pid::from_raw(pid as i32), Signal::SIGTERM).map_err(|e| {
            SupervisorError::Terminate {
                pid,
                reason: e.to_string(),
            }
        })?;
        debug!(device = %device, pid, "Sent SIGTERM to stream process");

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let reaper = async move {
                    match child.wait().await {
                        Ok(status) => info!(device = %device, pid, %status, "Stream process exited"),
                        Err(e) => warn!(device = %device, pid, error = %e, "Failed to reap stream process"),
                    }
                };
                reapers.lock().spawn_on(reaper, &handle);
            }
            // Outside a runtime the child is dropped and killed
            Err(_) => drop(child),
        }

        Ok(())
    }
}
