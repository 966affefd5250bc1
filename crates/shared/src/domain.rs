use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

use crate::error::StickerOutOfRange;

pub const FACE_COUNT: usize = 6;
pub const FACE_SIZE: usize = 3;
pub const STICKERS_PER_FACE: usize = FACE_SIZE * FACE_SIZE;
pub const STICKER_COUNT: usize = FACE_COUNT * STICKERS_PER_FACE;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(JobId);

macro_rules! ordinal_enum {
    ($name:ident { $($variant:ident = $ordinal:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant = $ordinal),+
        }

        impl $name {
            pub const ALL: [$name; FACE_COUNT] = [$($name::$variant),+];

            pub fn ordinal(self) -> u8 {
                self as u8
            }

            pub fn from_ordinal(ordinal: u8) -> Option<Self> {
                match ordinal {
                    $($ordinal => Some($name::$variant),)+
                    _ => None,
                }
            }

            pub fn name(self) -> &'static str {
                match self {
                    $($name::$variant => stringify!($variant),)+
                }
            }

            /// Case-insensitive lookup by display name.
            pub fn from_name(name: &str) -> Option<Self> {
                Self::ALL
                    .into_iter()
                    .find(|candidate| candidate.name().eq_ignore_ascii_case(name.trim()))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

ordinal_enum!(Color {
    Green = 0,
    Yellow = 1,
    White = 2,
    Red = 3,
    Orange = 4,
    Blue = 5,
});

ordinal_enum!(Face {
    Front = 0,
    Right = 1,
    Left = 2,
    Top = 3,
    Bottom = 4,
    Back = 5,
});

impl Color {
    /// The character this color occupies in a cube string.
    pub fn digit(self) -> char {
        char::from(b'0' + self.ordinal())
    }

    pub fn from_digit(digit: char) -> Option<Self> {
        let value = digit.to_digit(10)?;
        u8::try_from(value).ok().and_then(Self::from_ordinal)
    }
}

impl Face {
    /// Color every sticker of this face carries in the reference state.
    pub fn reference_color(self) -> Color {
        Color::ALL[usize::from(self.ordinal())]
    }
}

/// Address of one sticker. Always in range once constructed, including when deserialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawStickerPos")]
pub struct StickerPos {
    face: Face,
    row: u8,
    col: u8,
}

#[derive(Deserialize)]
struct RawStickerPos {
    face: Face,
    row: u8,
    col: u8,
}

impl TryFrom<RawStickerPos> for StickerPos {
    type Error = StickerOutOfRange;

    fn try_from(raw: RawStickerPos) -> Result<Self, Self::Error> {
        Self::on_face(raw.face, raw.row, raw.col)
    }
}

impl StickerPos {
    pub fn new(face: u8, row: u8, col: u8) -> Result<Self, StickerOutOfRange> {
        let in_range = usize::from(row) < FACE_SIZE && usize::from(col) < FACE_SIZE;
        match Face::from_ordinal(face) {
            Some(face) if in_range => Ok(Self { face, row, col }),
            _ => Err(StickerOutOfRange { face, row, col }),
        }
    }

    pub fn on_face(face: Face, row: u8, col: u8) -> Result<Self, StickerOutOfRange> {
        Self::new(face.ordinal(), row, col)
    }

    pub fn face(self) -> Face {
        self.face
    }

    pub fn row(self) -> u8 {
        self.row
    }

    pub fn col(self) -> u8 {
        self.col
    }

    /// Offset into the dense grid: face-major, then row-major within a face.
    pub fn index(self) -> usize {
        usize::from(self.face.ordinal()) * STICKERS_PER_FACE
            + usize::from(self.row) * FACE_SIZE
            + usize::from(self.col)
    }

    pub fn all() -> impl Iterator<Item = StickerPos> {
        Face::ALL.into_iter().flat_map(|face| {
            (0..FACE_SIZE as u8).flat_map(move |row| {
                (0..FACE_SIZE as u8).map(move |col| StickerPos { face, row, col })
            })
        })
    }
}

impl fmt::Display for StickerPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {})", self.face, self.row, self.col)
    }
}

/// Result of the per-color cardinality check.
///
/// `Invalid` carries only the colors whose count deviates from nine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Validity {
    Valid,
    Invalid { counts: BTreeMap<Color, usize> },
}

impl Validity {
    pub fn is_valid(&self) -> bool {
        matches!(self, Validity::Valid)
    }
}

impl fmt::Display for Validity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Validity::Valid => f.write_str("Valid cube"),
            Validity::Invalid { counts } => {
                f.write_str("Invalid cube - ")?;
                for (i, (color, count)) in counts.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{color}: {count}")?;
                }
                Ok(())
            }
        }
    }
}
