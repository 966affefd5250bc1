//! Cube designer core: sticker grid, cardinality check, solver jobs and trace playback.
//!
//! Front-ends drive everything through [`DesignerSession::dispatch`] and render the
//! [`Notification`](shared::protocol::Notification)s it returns.

pub mod cube_state;
pub mod playback;
pub mod session;
pub mod solver_job;
pub mod validator;

#[cfg(test)]
mod test_support;

pub use cube_state::CubeState;
pub use playback::{PlaybackController, PlaybackError};
pub use session::{DesignerSession, SolverSettings};
pub use solver_job::{
    timeout_message, JobError, JobEvent, JobOutcome, JobState, SolveFailure, SolverJob,
    DEFAULT_SOLVE_TIMEOUT,
};
pub use validator::Validator;
