//! Console command language: one line of text becomes one intent or one local action.

use shared::{
    domain::{Color, Face, StickerPos},
    protocol::Intent,
};
use thiserror::Error;

pub const HELP: &str = "\
commands:
  color <0-5|name>          select the paint color
  paint <face> <row> <col>  paint one sticker with the selected color
  set <face> <row> <col> <color>
                            set one sticker to an explicit color
  load <cube string>        load a 54-digit cube string
  reset                     restore the solved reference cube
  solve                     run the external solver on the current cube
  cancel                    cancel the running solve
  clear                     clear the solution trace
  step <n>                  jump to step n of the trace (1-based)
  show                      print the cube net and validity
  steps                     list the solution trace
  help                      print this help
  quit                      exit
faces: 0 front, 1 right, 2 left, 3 top, 4 bottom, 5 back (rows and columns 0-2)
colors: 0 green, 1 yellow, 2 white, 3 red, 4 orange, 5 blue";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Intent(Intent),
    Show,
    Steps,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("unknown command '{0}'; type 'help' for the command list")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("'{0}' is not a color; use 0-5 or a color name")]
    BadColor(String),
    #[error("'{0}' is not a face; use 0-5 or a face name")]
    BadFace(String),
    #[error("'{0}' is not a row or column; use 0-2")]
    BadCoordinate(String),
    #[error("'{0}' is not a step number; steps are numbered from 1")]
    BadStep(String),
}

/// Blank lines parse to `None`.
pub fn parse_command(line: &str) -> Result<Option<Command>, CommandError> {
    let mut words = line.split_whitespace();
    let Some(keyword) = words.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = words.collect();

    let command = match (keyword.to_ascii_lowercase().as_str(), args.as_slice()) {
        ("color", [color]) => Command::Intent(Intent::SelectColor(parse_color(color)?)),
        ("color", _) => return Err(CommandError::Usage("color <0-5|name>")),
        ("paint", [face, row, col]) => {
            Command::Intent(Intent::PaintSticker(parse_pos(face, row, col)?))
        }
        ("paint", _) => return Err(CommandError::Usage("paint <face> <row> <col>")),
        ("set", [face, row, col, color]) => Command::Intent(Intent::SetSticker {
            pos: parse_pos(face, row, col)?,
            color: parse_color(color)?,
        }),
        ("set", _) => return Err(CommandError::Usage("set <face> <row> <col> <color>")),
        // Length and alphabet are checked by the session so the rejection is reported there.
        ("load", [cube]) => Command::Intent(Intent::LoadString((*cube).to_string())),
        ("load", _) => return Err(CommandError::Usage("load <cube string>")),
        ("reset", []) => Command::Intent(Intent::Reset),
        ("solve", []) => Command::Intent(Intent::Solve),
        ("cancel", []) => Command::Intent(Intent::CancelSolve),
        ("clear", []) => Command::Intent(Intent::ClearSolution),
        ("step", [n]) => Command::Intent(Intent::SelectStep(parse_step(n)?)),
        ("step", _) => return Err(CommandError::Usage("step <n>")),
        ("show", []) => Command::Show,
        ("steps", []) => Command::Steps,
        ("help" | "?", _) => Command::Help,
        ("quit" | "exit", []) => Command::Quit,
        _ => return Err(CommandError::Unknown(line.trim().to_string())),
    };
    Ok(Some(command))
}

fn parse_color(raw: &str) -> Result<Color, CommandError> {
    raw.parse::<u8>()
        .ok()
        .and_then(Color::from_ordinal)
        .or_else(|| Color::from_name(raw))
        .ok_or_else(|| CommandError::BadColor(raw.to_string()))
}

fn parse_face(raw: &str) -> Result<Face, CommandError> {
    raw.parse::<u8>()
        .ok()
        .and_then(Face::from_ordinal)
        .or_else(|| Face::from_name(raw))
        .ok_or_else(|| CommandError::BadFace(raw.to_string()))
}

fn parse_pos(face: &str, row: &str, col: &str) -> Result<StickerPos, CommandError> {
    let face = parse_face(face)?;
    let coordinate = |raw: &str| {
        raw.parse::<u8>()
            .map_err(|_| CommandError::BadCoordinate(raw.to_string()))
    };
    let (row_value, col_value) = (coordinate(row)?, coordinate(col)?);
    StickerPos::on_face(face, row_value, col_value).map_err(|err| {
        let culprit = if err.row > 2 { row } else { col };
        CommandError::BadCoordinate(culprit.to_string())
    })
}

fn parse_step(raw: &str) -> Result<usize, CommandError> {
    match raw.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n - 1),
        _ => Err(CommandError::BadStep(raw.to_string())),
    }
}
