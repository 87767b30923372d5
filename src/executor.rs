//! Command execution capability used by the sampling driver.
//!
//! The driver never spawns processes itself. It holds two [`Executor`]
//! handles, one privileged and one unprivileged, so tests can swap in a
//! [`FakeExecutor`] that answers from canned output.

use std::collections::HashMap;
use std::io::Read;
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use nix::unistd::geteuid;
use tracing::{debug, trace, warn};

use crate::error::ExecError;

/// Poll interval while waiting for a child with a deadline.
const WAIT_POLL: Duration = Duration::from_millis(20);

/// Runs an external command and returns its captured standard output.
pub trait Executor: Send + Sync {
    fn run(&self, program: &str, args: &[&str]) -> Result<String, ExecError>;
}

/// Shared handle to an executor.
pub type SharedExecutor = Arc<dyn Executor>;

/// Spawns real processes.
#[derive(Debug, Clone)]
pub struct ProcessExecutor {
    privileged: bool,
    timeout: Option<Duration>,
}

impl ProcessExecutor {
    /// Unprivileged executor: runs the program as the current user.
    pub fn base() -> Self {
        Self {
            privileged: false,
            timeout: None,
        }
    }

    /// Privileged executor: runs directly as root, otherwise through `sudo -n`.
    pub fn root() -> Self {
        Self {
            privileged: true,
            timeout: None,
        }
    }

    /// Kill the child and fail once `timeout` elapses.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn command(&self, program: &str, args: &[&str]) -> Command {
        if self.privileged && !geteuid().is_root() {
            let mut cmd = Command::new("sudo");
            cmd.arg("-n").arg(program).args(args);
            cmd
        } else {
            let mut cmd = Command::new(program);
            cmd.args(args);
            cmd
        }
    }
}

impl Executor for ProcessExecutor {
    fn run(&self, program: &str, args: &[&str]) -> Result<String, ExecError> {
        debug!(program, ?args, privileged = self.privileged, "Running command");

        let mut child = self
            .command(program, args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ExecError::Spawn {
                program: program.to_string(),
                source,
            })?;

        // Pipes are drained off-thread; a full pipe would stall the child.
        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        let status = match self.timeout {
            None => child.wait(),
            Some(limit) => {
                let deadline = Instant::now() + limit;
                loop {
                    match child.try_wait() {
                        Ok(Some(status)) => break Ok(status),
                        Ok(None) if Instant::now() >= deadline => {
                            if let Err(e) = child.kill() {
                                warn!(
                                    program,
                                    pid = child.id(),
                                    "Failed to kill timed out child: {}",
                                    e
                                );
                            }
                            if let Err(e) = child.wait() {
                                warn!(program, "Failed to reap timed out child: {}", e);
                            }
                            return Err(ExecError::Timeout {
                                program: program.to_string(),
                                secs: limit.as_secs(),
                            });
                        }
                        Ok(None) => thread::sleep(WAIT_POLL),
                        Err(e) => break Err(e),
                    }
                }
            }
        }
        .map_err(|source| ExecError::Spawn {
            program: program.to_string(),
            source,
        })?;

        let out = stdout.map(join).unwrap_or_default();
        let err = stderr.map(join).unwrap_or_default();

        if !status.success() {
            return Err(ExecError::Status {
                program: program.to_string(),
                status: status.to_string(),
                stderr: String::from_utf8_lossy(&err).trim().to_string(),
            });
        }

        trace!(program, bytes = out.len(), "Command finished");
        String::from_utf8(out).map_err(|_| ExecError::Utf8 {
            program: program.to_string(),
        })
    }
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> thread::JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        buf
    })
}

fn join(handle: thread::JoinHandle<Vec<u8>>) -> Vec<u8> {
    handle.join().unwrap_or_default()
}

/// Canned answer for a [`FakeExecutor`].
#[derive(Debug, Clone)]
pub struct FakeResponse {
    pub out: String,
    pub err: Option<String>,
}

impl FakeResponse {
    pub fn ok(out: impl Into<String>) -> Self {
        Self {
            out: out.into(),
            err: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            out: String::new(),
            err: Some(message.into()),
        }
    }
}

/// Deterministic executor answering from a command-name keyed map.
///
/// Invocations through `env` are keyed on the first argument that is not a
/// `NAME=value` assignment, so `env LC_ALL=C sar -dp 1 1` looks up `sar`.
#[derive(Debug, Clone, Default)]
pub struct FakeExecutor {
    responses: HashMap<String, FakeResponse>,
}

impl FakeExecutor {
    pub fn new(responses: HashMap<String, FakeResponse>) -> Self {
        Self { responses }
    }

    /// Adds or replaces the response for `command`.
    pub fn respond(mut self, command: impl Into<String>, response: FakeResponse) -> Self {
        self.responses.insert(command.into(), response);
        self
    }
}

impl Executor for FakeExecutor {
    fn run(&self, program: &str, args: &[&str]) -> Result<String, ExecError> {
        let key = if program == "env" {
            args.iter()
                .find(|a| !a.contains('='))
                .copied()
                .unwrap_or(program)
        } else {
            program
        };

        match self.responses.get(key) {
            Some(FakeResponse { err: Some(msg), .. }) => Err(ExecError::Canned(msg.clone())),
            Some(FakeResponse { out, .. }) => Ok(out.clone()),
            None => Err(ExecError::NotFound(key.to_string())),
        }
    }
}
