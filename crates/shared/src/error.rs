use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A cube string failed the length or alphabet check. Nothing was mutated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CubeStringError {
    #[error("cube string must be exactly 54 characters long, got {actual} characters")]
    WrongLength { actual: usize },
    #[error(
        "cube string must contain only digits 0-5, found invalid character '{character}' at position {position}"
    )]
    InvalidCharacter { character: char, position: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("sticker (face {face}, row {row}, col {col}) is outside the 6x3x3 grid")]
pub struct StickerOutOfRange {
    pub face: u8,
    pub row: u8,
    pub col: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionCode {
    MalformedInput,
    InvalidCube,
    SolveInProgress,
    NoActiveSolve,
    NoSuchStep,
}

/// An intent the session refused. Carried back to the front-end as a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejection {
    pub code: RejectionCode,
    pub message: String,
}

impl Rejection {
    pub fn new(code: RejectionCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl From<CubeStringError> for Rejection {
    fn from(value: CubeStringError) -> Self {
        Self::new(RejectionCode::MalformedInput, value.to_string())
    }
}
