//! Intent dispatch: routes each front-end intent to one core operation and reports the
//! resulting notifications.

use std::{path::PathBuf, sync::Arc, time::Duration};

use crossbeam_channel::{unbounded, Receiver, Sender};
use shared::{
    domain::{Color, JobId, StickerPos, Validity},
    error::{Rejection, RejectionCode},
    protocol::{parse_solution_output, CubeString, Intent, Notification},
};
use solver_port::{SolveRequest, SolverPort};
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

use crate::{
    cube_state::CubeState,
    playback::{PlaybackController, PlaybackError},
    solver_job::{
        timeout_message, JobEvent, JobOutcome, JobState, SolverJob, DEFAULT_SOLVE_TIMEOUT,
    },
    validator::Validator,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverSettings {
    pub working_dir: PathBuf,
    pub timeout: Duration,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            working_dir: PathBuf::from("."),
            timeout: DEFAULT_SOLVE_TIMEOUT,
        }
    }
}

/// Single-owner application session. Lives on the interactive thread; every method
/// returns without waiting on the solver.
pub struct DesignerSession {
    cube: CubeState,
    selected_color: Color,
    validity: Validity,
    playback: PlaybackController,
    solver: Arc<dyn SolverPort>,
    settings: SolverSettings,
    runtime: Handle,
    job: Option<SolverJob>,
    next_job_id: u64,
    job_tx: Sender<JobEvent>,
    job_rx: Receiver<JobEvent>,
}

impl DesignerSession {
    pub fn new(solver: Arc<dyn SolverPort>, settings: SolverSettings, runtime: Handle) -> Self {
        let (job_tx, job_rx) = unbounded();
        let cube = CubeState::reference();
        let validity = Validator::check(&cube);
        Self {
            cube,
            selected_color: Color::Green,
            validity,
            playback: PlaybackController::new(),
            solver,
            settings,
            runtime,
            job: None,
            next_job_id: 1,
            job_tx,
            job_rx,
        }
    }

    pub fn cube(&self) -> &CubeState {
        &self.cube
    }

    pub fn cube_string(&self) -> CubeString {
        self.cube.to_cube_string()
    }

    pub fn validity(&self) -> &Validity {
        &self.validity
    }

    pub fn selected_color(&self) -> Color {
        self.selected_color
    }

    pub fn playback(&self) -> &PlaybackController {
        &self.playback
    }

    pub fn job_state(&self) -> Option<JobState> {
        self.job.as_ref().map(SolverJob::state)
    }

    pub fn is_solving(&self) -> bool {
        self.job.as_ref().is_some_and(SolverJob::is_running)
    }

    /// Receiver side of the job channel, for drivers that block in a `select!`.
    pub fn job_events(&self) -> Receiver<JobEvent> {
        self.job_rx.clone()
    }

    pub fn dispatch(&mut self, intent: Intent) -> Vec<Notification> {
        debug!(?intent, "dispatching intent");
        let mut out = Vec::new();
        match intent {
            Intent::SelectColor(color) => {
                self.selected_color = color;
                out.push(Notification::ColorSelected(color));
            }
            Intent::PaintSticker(pos) => {
                self.set_sticker(pos, self.selected_color, &mut out);
            }
            Intent::SetSticker { pos, color } => {
                self.set_sticker(pos, color, &mut out);
            }
            Intent::LoadString(text) => match self.cube.load_from_cube_string(text.trim()) {
                Ok(()) => self.cube_changed(&mut out),
                Err(err) => out.push(reject(err.into())),
            },
            Intent::Reset => {
                self.cube.reset_to_reference();
                self.cube_changed(&mut out);
            }
            Intent::Solve => out.push(self.start_solve()),
            Intent::CancelSolve => out.push(self.cancel_solve()),
            Intent::ClearSolution => {
                self.playback.clear();
                out.push(Notification::SolutionCleared);
            }
            Intent::SelectStep(position) => self.select_step(position, &mut out),
        }
        out
    }

    /// Applies one job event. Events from jobs that are no longer running are dropped.
    pub fn handle_job_event(&mut self, event: JobEvent) -> Vec<Notification> {
        let Some(job) = self.job.as_mut().filter(|job| job.id() == event.job_id) else {
            debug!(job_id = %event.job_id, "dropping event from a replaced job");
            return Vec::new();
        };
        if !job.complete(&event.outcome) {
            debug!(
                job_id = %event.job_id,
                state = ?job.state(),
                "dropping event for a finished job"
            );
            return Vec::new();
        }

        let job_id = event.job_id;
        let notification = match event.outcome {
            JobOutcome::Succeeded { stdout } => {
                let steps = parse_solution_output(&stdout);
                info!(%job_id, steps = steps.len(), "solution trace loaded");
                self.playback.load_trace(steps.clone());
                Notification::SolveSucceeded { job_id, steps }
            }
            JobOutcome::Failed(failure) => Notification::SolveFailed {
                job_id,
                message: failure.message(),
            },
            JobOutcome::TimedOut { after } => Notification::SolveTimedOut {
                job_id,
                message: timeout_message(after),
            },
        };
        vec![notification]
    }

    /// Drains whatever job events are ready without waiting.
    pub fn pump_job_events(&mut self) -> Vec<Notification> {
        let mut out = Vec::new();
        while let Ok(event) = self.job_rx.try_recv() {
            out.extend(self.handle_job_event(event));
        }
        out
    }

    fn set_sticker(&mut self, pos: StickerPos, color: Color, out: &mut Vec<Notification>) {
        self.cube.set_sticker(pos, color);
        self.cube_changed(out);
    }

    fn cube_changed(&mut self, out: &mut Vec<Notification>) {
        out.push(Notification::CubeStringChanged(self.cube.to_cube_string()));
        let validity = Validator::check(&self.cube);
        if validity != self.validity {
            self.validity = validity.clone();
            out.push(Notification::ValidityChanged(validity));
        }
    }

    fn start_solve(&mut self) -> Notification {
        if self.is_solving() {
            return reject(Rejection::new(
                RejectionCode::SolveInProgress,
                "A solve is already running",
            ));
        }
        let validity = Validator::check(&self.cube);
        if !validity.is_valid() {
            return reject(Rejection::new(
                RejectionCode::InvalidCube,
                format!("Cannot solve: {validity}"),
            ));
        }

        let job_id = JobId(self.next_job_id);
        self.next_job_id += 1;
        let cube = self.cube.to_cube_string();
        let request = SolveRequest {
            cube: cube.clone(),
            working_dir: self.settings.working_dir.clone(),
        };

        let mut job = SolverJob::new(job_id);
        if let Err(err) = job.start(
            &self.runtime,
            Arc::clone(&self.solver),
            request,
            self.settings.timeout,
            self.job_tx.clone(),
        ) {
            warn!("failed to start solver job: {err}");
            return reject(Rejection::new(RejectionCode::SolveInProgress, err.to_string()));
        }
        info!(%job_id, solver = %self.solver.describe(), "solve started");
        self.job = Some(job);
        Notification::SolveStarted { job_id, cube }
    }

    fn cancel_solve(&mut self) -> Notification {
        let Some(job) = self.job.as_mut().filter(|job| job.is_running()) else {
            return reject(Rejection::new(
                RejectionCode::NoActiveSolve,
                "No solve is running",
            ));
        };
        job.cancel();
        Notification::SolveCancelled { job_id: job.id() }
    }

    fn select_step(&mut self, position: usize, out: &mut Vec<Notification>) {
        let selected = self
            .playback
            .select_step(position, &mut self.cube)
            .map(Clone::clone);
        match selected {
            Ok(step) => {
                self.cube_changed(out);
                out.push(Notification::StepSelected {
                    position,
                    step,
                    cube: self.cube.to_cube_string(),
                });
            }
            Err(err @ PlaybackError::NoSuchStep { .. }) => {
                out.push(reject(Rejection::new(
                    RejectionCode::NoSuchStep,
                    err.to_string(),
                )));
            }
            Err(err @ PlaybackError::MalformedStep { .. }) => {
                out.push(reject(Rejection::new(
                    RejectionCode::MalformedInput,
                    err.to_string(),
                )));
            }
        }
    }
}

fn reject(rejection: Rejection) -> Notification {
    warn!(code = ?rejection.code, "intent rejected: {}", rejection.message);
    Notification::IntentRejected(rejection)
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
