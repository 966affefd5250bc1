use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    domain::{Color, JobId, StickerPos, Validity, STICKER_COUNT},
    error::{CubeStringError, Rejection},
};

/// Canonical 54-character encoding of a cube: faces 0..5, each face row-major,
/// one digit `0`-`5` per sticker.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CubeString(String);

impl CubeString {
    pub fn parse(raw: &str) -> Result<Self, CubeStringError> {
        Self::decode(raw)?;
        Ok(Self(raw.to_string()))
    }

    /// Decodes every sticker color, failing on the first problem found.
    pub fn decode(raw: &str) -> Result<[Color; STICKER_COUNT], CubeStringError> {
        let actual = raw.chars().count();
        if actual != STICKER_COUNT {
            return Err(CubeStringError::WrongLength { actual });
        }

        let mut colors = [Color::Green; STICKER_COUNT];
        for (position, (slot, character)) in colors.iter_mut().zip(raw.chars()).enumerate() {
            *slot = Color::from_digit(character).ok_or(CubeStringError::InvalidCharacter {
                character,
                position,
            })?;
        }
        Ok(colors)
    }

    pub fn from_colors(colors: &[Color; STICKER_COUNT]) -> Self {
        Self(colors.iter().map(|color| color.digit()).collect())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for CubeString {
    type Err = CubeStringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CubeString {
    type Error = CubeStringError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::decode(&value)?;
        Ok(Self(value))
    }
}

impl From<CubeString> for String {
    fn from(value: CubeString) -> Self {
        value.0
    }
}

impl fmt::Display for CubeString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One line of a solver trace. Tokens are carried exactly as the solver printed them;
/// `resulting_cube` is only checked when the step is replayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolutionStep {
    pub index: String,
    #[serde(rename = "move")]
    pub mv: String,
    pub resulting_cube: String,
}

impl SolutionStep {
    pub fn new(
        index: impl Into<String>,
        mv: impl Into<String>,
        resulting_cube: impl Into<String>,
    ) -> Self {
        Self {
            index: index.into(),
            mv: mv.into(),
            resulting_cube: resulting_cube.into(),
        }
    }

    pub fn label(&self) -> String {
        format!("Step {}: {}", self.index, self.mv)
    }

    pub fn resulting_cube_string(&self) -> Result<CubeString, CubeStringError> {
        CubeString::parse(&self.resulting_cube)
    }
}

const STEP_PREFIX: &str = "step";
const STEP_INDEX_PREFIX: &str = "step ";
const STEP_INDEX_SEPARATOR: &str = ": ";
const STEP_CUBE_SEPARATOR: char = '|';

/// Turns raw solver stdout into the ordered trace.
///
/// Lines of the form `step <token>: <move>|<cube>` become steps; everything else is
/// skipped without error. Output with no such lines is an empty trace.
pub fn parse_solution_output(output: &str) -> Vec<SolutionStep> {
    output
        .trim()
        .lines()
        .filter_map(|line| {
            let step = parse_step_line(line);
            if step.is_none() && !line.trim().is_empty() {
                tracing::trace!(line, "skipping non-step solver output line");
            }
            step
        })
        .collect()
}

pub fn parse_step_line(line: &str) -> Option<SolutionStep> {
    if !line.contains(STEP_CUBE_SEPARATOR) || !line.starts_with(STEP_PREFIX) {
        return None;
    }

    let (head, tail) = line.split_once(STEP_INDEX_SEPARATOR)?;
    let index = head.strip_prefix(STEP_INDEX_PREFIX).unwrap_or(head);

    let mut parts = tail.split(STEP_CUBE_SEPARATOR);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(mv), Some(cube), None) => Some(SolutionStep::new(index, mv, cube)),
        _ => None,
    }
}

/// A user action forwarded by the front-end. Each maps to exactly one core operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum Intent {
    SelectColor(Color),
    PaintSticker(StickerPos),
    SetSticker { pos: StickerPos, color: Color },
    LoadString(String),
    Reset,
    Solve,
    CancelSolve,
    ClearSolution,
    /// Zero-based position in the loaded trace.
    SelectStep(usize),
}

/// Everything the core reports back to the front-end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum Notification {
    ColorSelected(Color),
    CubeStringChanged(CubeString),
    ValidityChanged(Validity),
    SolveStarted {
        job_id: JobId,
        cube: CubeString,
    },
    SolveSucceeded {
        job_id: JobId,
        steps: Vec<SolutionStep>,
    },
    SolveFailed {
        job_id: JobId,
        message: String,
    },
    SolveTimedOut {
        job_id: JobId,
        message: String,
    },
    SolveCancelled {
        job_id: JobId,
    },
    SolutionCleared,
    StepSelected {
        position: usize,
        step: SolutionStep,
        cube: CubeString,
    },
    IntentRejected(Rejection),
}
