use shared::{error::CubeStringError, protocol::SolutionStep};
use thiserror::Error;

use crate::cube_state::CubeState;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    #[error("no solution step at position {position} (trace has {len} steps)")]
    NoSuchStep { position: usize, len: usize },
    #[error("failed to load cube state for step {index}: {source}")]
    MalformedStep {
        index: String,
        #[source]
        source: CubeStringError,
    },
}

/// Holds the latest solution trace and replays any step into the cube on request.
#[derive(Debug, Default)]
pub struct PlaybackController {
    trace: Vec<SolutionStep>,
    current: Option<usize>,
}

impl PlaybackController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_trace(&mut self, steps: Vec<SolutionStep>) {
        self.trace = steps;
        self.current = None;
    }

    /// Writes the step's resulting cube into `cube`. Solver-produced states skip the
    /// cardinality check; only the string format is enforced.
    pub fn select_step(
        &mut self,
        position: usize,
        cube: &mut CubeState,
    ) -> Result<&SolutionStep, PlaybackError> {
        let step = self.trace.get(position).ok_or(PlaybackError::NoSuchStep {
            position,
            len: self.trace.len(),
        })?;

        cube.load_from_cube_string(&step.resulting_cube)
            .map_err(|source| PlaybackError::MalformedStep {
                index: step.index.clone(),
                source,
            })?;

        self.current = Some(position);
        Ok(step)
    }

    pub fn clear(&mut self) {
        self.trace.clear();
        self.current = None;
    }

    pub fn steps(&self) -> &[SolutionStep] {
        &self.trace
    }

    pub fn len(&self) -> usize {
        self.trace.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trace.is_empty()
    }

    pub fn current(&self) -> Option<usize> {
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trace() -> Vec<SolutionStep> {
        vec![
            SolutionStep::new("1", "R", "1".repeat(54)),
            SolutionStep::new("2", "U", "2".repeat(54)),
            SolutionStep::new("3", "F'", "012345".repeat(9)),
        ]
    }

    #[test]
    fn free_scrubbing_in_any_order_with_repeats() {
        let mut playback = PlaybackController::new();
        playback.load_trace(trace());
        let mut cube = CubeState::reference();

        for position in [2, 0, 1, 1, 2, 0, 2] {
            let expected = playback.steps()[position].resulting_cube.clone();
            playback
                .select_step(position, &mut cube)
                .expect("selectable");
            assert_eq!(cube.to_cube_string().as_str(), expected);
            assert_eq!(playback.current(), Some(position));
        }
    }

    #[test]
    fn selecting_out_of_range_fails_without_touching_cube() {
        let mut playback = PlaybackController::new();
        playback.load_trace(trace());
        let mut cube = CubeState::reference();

        let err = playback.select_step(3, &mut cube).expect_err("out of range");
        assert_eq!(err, PlaybackError::NoSuchStep { position: 3, len: 3 });
        assert_eq!(cube, CubeState::reference());
    }

    #[test]
    fn malformed_step_cube_is_rejected_atomically() {
        let mut playback = PlaybackController::new();
        playback.load_trace(vec![SolutionStep::new("1", "R", "not-a-cube")]);
        let mut cube = CubeState::reference();

        let err = playback.select_step(0, &mut cube).expect_err("malformed");
        assert!(matches!(err, PlaybackError::MalformedStep { ref index, .. } if index == "1"));
        assert_eq!(cube, CubeState::reference());
        assert_eq!(playback.current(), None);
    }

    #[test]
    fn load_replaces_and_clear_discards_without_touching_cube() {
        let mut playback = PlaybackController::new();
        playback.load_trace(trace());
        let mut cube = CubeState::reference();
        playback.select_step(1, &mut cube).expect("selectable");

        playback.load_trace(vec![SolutionStep::new("9", "B", "3".repeat(54))]);
        assert_eq!(playback.len(), 1);
        assert_eq!(playback.current(), None);

        playback.clear();
        assert!(playback.is_empty());
        assert_eq!(cube.to_cube_string().as_str(), "2".repeat(54));
    }
}
