use std::{
    io::ErrorKind,
    path::PathBuf,
    process::{Output, Stdio},
};

use async_trait::async_trait;
use shared::protocol::CubeString;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, warn};

/// Kills the solver's whole process group when dropped before the leader was reaped.
///
/// Launchers such as `go run` start the real solver as a grandchild, which
/// `kill_on_drop` alone would leave running.
struct ProcessGroupGuard {
    pgid: Option<u32>,
}

impl ProcessGroupGuard {
    fn new(leader_pid: Option<u32>) -> Self {
        Self { pgid: leader_pid }
    }

    /// The leader has been reaped; its id may be reused, so never signal it.
    fn disarm(mut self) {
        self.pgid = None;
    }
}

impl Drop for ProcessGroupGuard {
    fn drop(&mut self) {
        let Some(pgid) = self.pgid.take() else {
            return;
        };
        kill_process_group(pgid);
    }
}

#[cfg(unix)]
fn kill_process_group(pgid: u32) {
    use nix::{
        sys::signal::{killpg, Signal},
        unistd::Pid,
    };

    let Ok(raw) = i32::try_from(pgid) else {
        return;
    };
    match killpg(Pid::from_raw(raw), Signal::SIGKILL) {
        Ok(()) => debug!(pgid, "killed solver process group"),
        Err(err) => debug!(pgid, "solver process group already gone: {err}"),
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pgid: u32) {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolveRequest {
    pub cube: CubeString,
    pub working_dir: PathBuf,
}

/// Everything a finished solver process left behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverOutput {
    /// `None` when the process was ended by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl SolverOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

impl From<Output> for SolverOutput {
    fn from(value: Output) -> Self {
        Self {
            exit_code: value.status.code(),
            stdout: String::from_utf8_lossy(&value.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&value.stderr).into_owned(),
        }
    }
}

#[derive(Debug, Error)]
pub enum SolverPortError {
    #[error("solver executable '{program}' was not found")]
    ExecutableNotFound { program: String },
    #[error("solver working directory '{}' does not exist", .path.display())]
    WorkingDirectory { path: PathBuf },
    #[error("failed to launch solver '{program}': {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// The external solving collaborator.
///
/// Implementations must stop the underlying work when the returned future is dropped;
/// that is how timeouts and cancellation reclaim the process.
#[async_trait]
pub trait SolverPort: Send + Sync {
    async fn solve(&self, request: &SolveRequest) -> Result<SolverOutput, SolverPortError>;
    fn describe(&self) -> String;
}

/// Runs `<program> <leading args...> <cube string>` in the request's working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessSolver {
    program: String,
    leading_args: Vec<String>,
}

impl ProcessSolver {
    pub fn new(program: impl Into<String>, leading_args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            leading_args,
        }
    }

    fn command(&self, request: &SolveRequest) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.leading_args)
            .arg(request.cube.as_str())
            .current_dir(&request.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(unix)]
        command.process_group(0);
        command
    }
}

#[async_trait]
impl SolverPort for ProcessSolver {
    async fn solve(&self, request: &SolveRequest) -> Result<SolverOutput, SolverPortError> {
        if !request.working_dir.is_dir() {
            return Err(SolverPortError::WorkingDirectory {
                path: request.working_dir.clone(),
            });
        }

        let child = self.command(request).spawn().map_err(|err| {
            warn!(program = %self.program, "failed to spawn solver: {err}");
            if err.kind() == ErrorKind::NotFound {
                SolverPortError::ExecutableNotFound {
                    program: self.program.clone(),
                }
            } else {
                SolverPortError::Launch {
                    program: self.program.clone(),
                    source: err,
                }
            }
        })?;
        debug!(program = %self.program, pid = ?child.id(), "solver process spawned");

        // The child moves into this future; dropping the future kills it and, through the
        // guard, everything it started in its process group.
        let group = ProcessGroupGuard::new(child.id());
        let output = child
            .wait_with_output()
            .await
            .map_err(|source| SolverPortError::Launch {
                program: self.program.clone(),
                source,
            })?;
        group.disarm();
        Ok(output.into())
    }

    fn describe(&self) -> String {
        let mut parts = Vec::with_capacity(self.leading_args.len() + 1);
        parts.push(self.program.as_str());
        parts.extend(self.leading_args.iter().map(String::as_str));
        parts.join(" ")
    }
}
