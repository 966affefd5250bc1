//! One external solve attempt: start, timeout, cancellation and result delivery.
//!
//! The job runs on a tokio task and reports back through a crossbeam channel with a
//! single [`JobEvent`]. The owning thread applies the terminal transition when it
//! receives that event, so the task never touches shared state.

use std::{
    fmt,
    sync::Arc,
    time::{Duration, Instant},
};

use crossbeam_channel::Sender;
use shared::domain::JobId;
use solver_port::{SolveRequest, SolverPort, SolverPortError};
use thiserror::Error;
use tokio::{runtime::Handle, task::JoinHandle};
use tracing::{debug, info, warn};

pub const DEFAULT_SOLVE_TIMEOUT: Duration = Duration::from_secs(60);
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error occurred";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Idle,
    Running,
    Succeeded,
    Failed,
    TimedOut,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveFailure {
    ExecutableNotFound { program: String },
    NonZeroExit { code: Option<i32>, stderr: String },
    Launch { detail: String },
}

impl SolveFailure {
    pub fn message(&self) -> String {
        match self {
            SolveFailure::ExecutableNotFound { program } => format!(
                "Solver executable '{program}' is not installed or not in PATH. Install it or configure solver.program to use the solver."
            ),
            SolveFailure::NonZeroExit { stderr, .. } => {
                let detail = stderr.trim();
                let detail = if detail.is_empty() {
                    UNKNOWN_ERROR_MESSAGE
                } else {
                    detail
                };
                format!("Failed to solve cube:\n{detail}")
            }
            SolveFailure::Launch { detail } => format!("An error occurred: {detail}"),
        }
    }
}

impl fmt::Display for SolveFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Succeeded { stdout: String },
    Failed(SolveFailure),
    TimedOut { after: Duration },
}

impl JobOutcome {
    pub fn terminal_state(&self) -> JobState {
        match self {
            JobOutcome::Succeeded { .. } => JobState::Succeeded,
            JobOutcome::Failed(_) => JobState::Failed,
            JobOutcome::TimedOut { .. } => JobState::TimedOut,
        }
    }
}

pub fn timeout_message(after: Duration) -> String {
    format!(
        "Solver timed out after {} seconds. The cube might be too complex.",
        after.as_secs()
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobEvent {
    pub job_id: JobId,
    pub outcome: JobOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JobError {
    #[error("solver job {job_id} cannot be started from state {state:?}")]
    AlreadyStarted { job_id: JobId, state: JobState },
}

pub struct SolverJob {
    id: JobId,
    state: JobState,
    task: Option<JoinHandle<()>>,
    started_at: Option<Instant>,
}

impl SolverJob {
    pub fn new(id: JobId) -> Self {
        Self {
            id,
            state: JobState::Idle,
            task: None,
            started_at: None,
        }
    }

    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == JobState::Running
    }

    /// Spawns the solver on `runtime` and returns immediately.
    pub fn start(
        &mut self,
        runtime: &Handle,
        port: Arc<dyn SolverPort>,
        request: SolveRequest,
        timeout: Duration,
        events: Sender<JobEvent>,
    ) -> Result<(), JobError> {
        if self.state != JobState::Idle {
            return Err(JobError::AlreadyStarted {
                job_id: self.id,
                state: self.state,
            });
        }

        let job_id = self.id;
        info!(
            %job_id,
            cube = %request.cube,
            working_dir = %request.working_dir.display(),
            "starting solver job"
        );
        self.task = Some(runtime.spawn(async move {
            let outcome = run_solver(port.as_ref(), &request, timeout).await;
            if events.send(JobEvent { job_id, outcome }).is_err() {
                debug!(%job_id, "job event receiver dropped before completion");
            }
        }));
        self.state = JobState::Running;
        self.started_at = Some(Instant::now());
        Ok(())
    }

    /// Aborts a running job. The solver future is dropped, which kills its process.
    pub fn cancel(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.state = JobState::Cancelled;
        info!(job_id = %self.id, "solver job cancelled");
        true
    }

    /// Applies the terminal transition for `outcome`. Returns false, changing nothing,
    /// when the job is not running.
    pub fn complete(&mut self, outcome: &JobOutcome) -> bool {
        if !self.is_running() {
            return false;
        }
        self.task = None;
        self.state = outcome.terminal_state();
        let elapsed_ms = self
            .started_at
            .map(|started| started.elapsed().as_millis() as u64)
            .unwrap_or_default();
        match outcome {
            JobOutcome::Succeeded { .. } => {
                info!(job_id = %self.id, elapsed_ms, "solver job succeeded")
            }
            JobOutcome::Failed(failure) => {
                warn!(job_id = %self.id, elapsed_ms, ?failure, "solver job failed")
            }
            JobOutcome::TimedOut { after } => {
                warn!(job_id = %self.id, timeout_s = after.as_secs(), "solver job timed out")
            }
        }
        true
    }
}

impl Drop for SolverJob {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

pub(crate) async fn run_solver(
    port: &dyn SolverPort,
    request: &SolveRequest,
    timeout: Duration,
) -> JobOutcome {
    match tokio::time::timeout(timeout, port.solve(request)).await {
        Err(_) => JobOutcome::TimedOut { after: timeout },
        Ok(Ok(output)) if output.success() => JobOutcome::Succeeded {
            stdout: output.stdout,
        },
        Ok(Ok(output)) => JobOutcome::Failed(SolveFailure::NonZeroExit {
            code: output.exit_code,
            stderr: output.stderr,
        }),
        Ok(Err(SolverPortError::ExecutableNotFound { program })) => {
            JobOutcome::Failed(SolveFailure::ExecutableNotFound { program })
        }
        Ok(Err(err)) => JobOutcome::Failed(SolveFailure::Launch {
            detail: err.to_string(),
        }),
    }
}

#[cfg(test)]
#[path = "tests/solver_job_tests.rs"]
mod tests;
